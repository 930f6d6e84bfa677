//! 시그널 결과 판정.
//!
//! 시그널 생성 이후의 캔들을 순서대로 리플레이하며 손절/익절 레벨
//! 터치를 판정합니다. 단순화된 캔들 리플레이이며 실거래 체결 검증을
//! 대체하지 않습니다 - 캔들 내부의 가격 경로를 알 수 없으므로 손절과
//! 익절이 같은 캔들에 닿으면 손절로 간주하는 보수적 가정을 씁니다.

use serde::{Deserialize, Serialize};
use signal_core::{Candle, Side, TradeSignal};
use std::fmt;

/// 시그널 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalOutcome {
    /// 손절 터치
    StopLoss,
    /// 1차 익절 (1.5R)
    TakeProfit1,
    /// 2차 익절 (3.0R)
    TakeProfit2,
    /// 3차 익절 (4.5R)
    TakeProfit3,
    /// 어느 레벨도 닿지 않음
    Open,
}

impl SignalOutcome {
    /// 수익 결과인지 확인합니다.
    pub fn is_win(self) -> bool {
        matches!(
            self,
            Self::TakeProfit1 | Self::TakeProfit2 | Self::TakeProfit3
        )
    }
}

impl fmt::Display for SignalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StopLoss => "SL",
            Self::TakeProfit1 => "TP1",
            Self::TakeProfit2 => "TP2",
            Self::TakeProfit3 => "TP3",
            Self::Open => "OPEN",
        };
        write!(f, "{}", s)
    }
}

/// 시그널 생성 이후 캔들로 결과를 판정합니다.
///
/// 캔들을 순서대로 보며:
/// - 손절이 먼저 닿으면(같은 캔들에서 익절과 동시에 닿는 경우 포함)
///   그때까지 도달한 최고 익절 단을 결과로, 없으면 손절을 결과로
///   합니다.
/// - 손절 전에 닿은 가장 높은 익절 단을 기록하고, 3단에 도달하면 즉시
///   종료합니다.
/// - 아무 레벨도 닿지 않으면 `Open`입니다.
pub fn replay_outcome(signal: &TradeSignal, candles: &[Candle]) -> SignalOutcome {
    let mut best_rung = 0usize;

    for candle in candles {
        let (touched_stop, rung) = match signal.side {
            Side::Long => {
                let stop = candle.low <= signal.stop_loss;
                let rung = if candle.high >= signal.take_profit_3 {
                    3
                } else if candle.high >= signal.take_profit_2 {
                    2
                } else if candle.high >= signal.take_profit_1 {
                    1
                } else {
                    0
                };
                (stop, rung)
            }
            Side::Short => {
                let stop = candle.high >= signal.stop_loss;
                let rung = if candle.low <= signal.take_profit_3 {
                    3
                } else if candle.low <= signal.take_profit_2 {
                    2
                } else if candle.low <= signal.take_profit_1 {
                    1
                } else {
                    0
                };
                (stop, rung)
            }
        };

        if touched_stop {
            return rung_outcome(best_rung).unwrap_or(SignalOutcome::StopLoss);
        }

        best_rung = best_rung.max(rung);
        if best_rung == 3 {
            return SignalOutcome::TakeProfit3;
        }
    }

    rung_outcome(best_rung).unwrap_or(SignalOutcome::Open)
}

fn rung_outcome(rung: usize) -> Option<SignalOutcome> {
    match rung {
        1 => Some(SignalOutcome::TakeProfit1),
        2 => Some(SignalOutcome::TakeProfit2),
        3 => Some(SignalOutcome::TakeProfit3),
        _ => None,
    }
}

/// 판정된 시그널들의 집계 통계.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeStats {
    /// 판정된 시그널 수
    pub total: usize,
    /// 수익 시그널 수
    pub wins: usize,
    /// 손실 시그널 수
    pub losses: usize,
    /// 미결 시그널 수
    pub open: usize,
    /// TP1 도달 수
    pub tp1_hits: usize,
    /// TP2 도달 수
    pub tp2_hits: usize,
    /// TP3 도달 수
    pub tp3_hits: usize,
    /// 손절 도달 수
    pub sl_hits: usize,
}

impl OutcomeStats {
    /// 결과를 집계에 반영합니다.
    pub fn record(&mut self, outcome: SignalOutcome) {
        self.total += 1;
        match outcome {
            SignalOutcome::StopLoss => {
                self.losses += 1;
                self.sl_hits += 1;
            }
            SignalOutcome::TakeProfit1 => {
                self.wins += 1;
                self.tp1_hits += 1;
            }
            SignalOutcome::TakeProfit2 => {
                self.wins += 1;
                self.tp2_hits += 1;
            }
            SignalOutcome::TakeProfit3 => {
                self.wins += 1;
                self.tp3_hits += 1;
            }
            SignalOutcome::Open => {
                self.open += 1;
            }
        }
    }

    /// 판정 완료 시그널 기준 승률 (%).
    pub fn accuracy(&self) -> f64 {
        let resolved = self.wins + self.losses;
        if resolved == 0 {
            return 0.0;
        }
        self.wins as f64 / resolved as f64 * 100.0
    }
}
