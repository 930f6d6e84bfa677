//! 시장 상태 분류기.
//!
//! ADX, 가격 범위, EMA 배열, 초피니스(방향 전환 비율)를 종합해
//! 추세/박스권을 판정합니다. 박스권에서의 진입을 걸러내는 것이
//! 목적입니다.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use signal_core::{Candle, MarketCondition, PipelineConfig};
use tracing::{debug, warn};

use crate::indicators::IndicatorSnapshot;

/// ADX 계산 기간.
const ADX_PERIOD: usize = 14;

/// 초피니스/변동성 분석 윈도우.
const CHOP_WINDOW: usize = 20;

/// 상태 분류 근거 리포트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeReport {
    /// ADX(14) 값
    pub adx: f64,
    /// 참조 구간 가격 범위 (%)
    pub range_pct: f64,
    /// 범위 내 현재가 위치 (0 = 저점, 100 = 고점)
    pub range_position: f64,
    /// 종가 변화율의 표준편차 (%)
    pub volatility: f64,
    /// 방향 전환 비율
    pub chop_ratio: f64,
    /// 추세 강도 점수
    pub trend_strength: f64,
    /// 판정 사유
    pub reason: String,
}

impl RegimeReport {
    fn empty(reason: &str) -> Self {
        Self {
            adx: 0.0,
            range_pct: 0.0,
            range_position: 50.0,
            volatility: 0.0,
            chop_ratio: 0.0,
            trend_strength: 0.0,
            reason: reason.to_string(),
        }
    }
}

struct RangeAnalysis {
    range_pct: f64,
    range_position: f64,
    is_range_bound: bool,
}

struct ChopAnalysis {
    volatility: f64,
    chop_ratio: f64,
    is_choppy: bool,
}

/// 시장 상태 분류기.
///
/// # 판정 로직
///
/// 1. ADX < 임계값 OR 좁은 범위 OR choppy → RangeBound
///    (변동성 > 3%면 VolatileRange로 승격)
/// 2. EMA 정배열 → ADX > 30이고 추세 강도 > 70이면 StrongUptrend,
///    아니면 WeakUptrend
/// 3. EMA 역배열 → 대칭으로 Strong/WeakDowntrend
/// 4. 배열 불명확 → RangeBound (mixed_signals)
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    config: PipelineConfig,
}

impl RegimeClassifier {
    /// 주어진 설정으로 분류기를 생성합니다.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// 시장 상태를 분류합니다.
    ///
    /// 50개 이상 캔들 입력에 대한 전함수입니다. 참조 구간에 못 미치는
    /// 입력은 `insufficient_data` 사유의 RangeBound로 연성 강등됩니다.
    pub fn classify(
        &self,
        snapshot: &IndicatorSnapshot,
        candles: &[Candle],
    ) -> (MarketCondition, RegimeReport) {
        if candles.len() < self.config.lookback {
            warn!(
                provided = candles.len(),
                required = self.config.lookback,
                "상태 분류 데이터 부족"
            );
            return (
                MarketCondition::RangeBound,
                RegimeReport::empty("insufficient_data"),
            );
        }

        let adx = self.adx(candles, ADX_PERIOD);
        let range = self.analyze_range(candles);
        let chop = self.analyze_chop(candles);

        let (condition, reason) = self.decide(
            adx,
            range.is_range_bound,
            snapshot.bullish_alignment(),
            snapshot.bearish_alignment(),
            chop.is_choppy,
            chop.volatility,
            snapshot.trend_strength,
        );

        debug!(
            condition = %condition,
            adx = adx,
            range_pct = range.range_pct,
            chop_ratio = chop.chop_ratio,
            reason = reason,
            "시장 상태 판정"
        );

        let report = RegimeReport {
            adx,
            range_pct: range.range_pct,
            range_position: range.range_position,
            volatility: chop.volatility,
            chop_ratio: chop.chop_ratio,
            trend_strength: snapshot.trend_strength,
            reason: reason.to_string(),
        };

        (condition, report)
    }

    /// 스칼라 중간 신호에서 상태를 결정합니다.
    #[allow(clippy::too_many_arguments)]
    fn decide(
        &self,
        adx: f64,
        is_range_bound: bool,
        bullish_alignment: bool,
        bearish_alignment: bool,
        is_choppy: bool,
        volatility: f64,
        trend_strength: f64,
    ) -> (MarketCondition, &'static str) {
        let ranging = adx < self.config.adx_threshold || is_range_bound || is_choppy;

        if ranging {
            return if volatility > self.config.volatile_range_pct {
                (MarketCondition::VolatileRange, "high_volatility_range")
            } else {
                (MarketCondition::RangeBound, "low_adx_or_narrow_range")
            };
        }

        if bullish_alignment {
            return if adx > 30.0 && trend_strength > 70.0 {
                (MarketCondition::StrongUptrend, "strong_bullish_trend")
            } else {
                (MarketCondition::WeakUptrend, "weak_bullish_trend")
            };
        }

        if bearish_alignment {
            return if adx > 30.0 && trend_strength > 70.0 {
                (MarketCondition::StrongDowntrend, "strong_bearish_trend")
            } else {
                (MarketCondition::WeakDowntrend, "weak_bearish_trend")
            };
        }

        (MarketCondition::RangeBound, "mixed_signals")
    }

    /// ADX(Average Directional Index) 계산.
    ///
    /// Directional Movement System: 상승폭/하락폭 비교로 ±DM을 고르고,
    /// ±DM과 TR을 Wilder 평활한 뒤 ±DI → DX → ADX 순서로 축약합니다.
    /// 마지막 원소를 반환합니다.
    fn adx(&self, candles: &[Candle], period: usize) -> f64 {
        let n = candles.len();
        if n < period + 1 {
            return 0.0;
        }

        let highs: Vec<f64> = candles
            .iter()
            .map(|c| c.high.to_f64().unwrap_or(0.0))
            .collect();
        let lows: Vec<f64> = candles
            .iter()
            .map(|c| c.low.to_f64().unwrap_or(0.0))
            .collect();
        let closes: Vec<f64> = candles
            .iter()
            .map(|c| c.close.to_f64().unwrap_or(0.0))
            .collect();

        let mut plus_dm = vec![0.0; n];
        let mut minus_dm = vec![0.0; n];
        let mut tr = vec![0.0; n];

        for i in 1..n {
            let up_move = highs[i] - highs[i - 1];
            let down_move = lows[i - 1] - lows[i];

            if up_move > down_move && up_move > 0.0 {
                plus_dm[i] = up_move;
            }
            if down_move > up_move && down_move > 0.0 {
                minus_dm[i] = down_move;
            }

            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            tr[i] = hl.max(hc).max(lc);
        }

        let smoothed_tr = wilder_smoothing(&tr, period);
        let smoothed_plus = wilder_smoothing(&plus_dm, period);
        let smoothed_minus = wilder_smoothing(&minus_dm, period);

        let mut plus_di = vec![0.0; n];
        let mut minus_di = vec![0.0; n];
        for i in period..n {
            if smoothed_tr[i] > 0.0 {
                plus_di[i] = smoothed_plus[i] / smoothed_tr[i] * 100.0;
                minus_di[i] = smoothed_minus[i] / smoothed_tr[i] * 100.0;
            }
        }

        let mut dx = vec![0.0; n];
        for i in period..n {
            let di_sum = plus_di[i] + minus_di[i];
            if di_sum > 0.0 {
                dx[i] = (plus_di[i] - minus_di[i]).abs() / di_sum * 100.0;
            }
        }

        let adx = wilder_smoothing(&dx, period);
        adx.last().copied().unwrap_or(0.0)
    }

    /// 참조 구간 가격 범위 분석.
    fn analyze_range(&self, candles: &[Candle]) -> RangeAnalysis {
        let start = candles.len().saturating_sub(self.config.lookback);
        let slice = &candles[start..];

        let high_max = slice
            .iter()
            .map(|c| c.high.to_f64().unwrap_or(0.0))
            .fold(f64::MIN, f64::max);
        let low_min = slice
            .iter()
            .map(|c| c.low.to_f64().unwrap_or(0.0))
            .fold(f64::MAX, f64::min);
        let current = candles
            .last()
            .map(|c| c.close.to_f64().unwrap_or(0.0))
            .unwrap_or(0.0);

        let price_range = high_max - low_min;
        let range_pct = if current > 0.0 {
            price_range / current * 100.0
        } else {
            0.0
        };
        let range_position = if price_range > 0.0 {
            (current - low_min) / price_range * 100.0
        } else {
            50.0
        };

        RangeAnalysis {
            range_pct,
            range_position,
            is_range_bound: range_pct < self.config.range_threshold_pct,
        }
    }

    /// 초피니스(방향 전환)와 변동성 분석.
    fn analyze_chop(&self, candles: &[Candle]) -> ChopAnalysis {
        let start = candles.len().saturating_sub(CHOP_WINDOW);
        let closes: Vec<f64> = candles[start..]
            .iter()
            .map(|c| c.close.to_f64().unwrap_or(0.0))
            .collect();
        let window_len = closes.len();

        // 연속 종가 델타 간 방향 전환 횟수
        let mut reversals = 0usize;
        for i in 1..window_len {
            let prev_change = closes[i] - closes[i - 1];
            let earlier_change = if i > 1 {
                closes[i - 1] - closes[i - 2]
            } else {
                0.0
            };
            if (prev_change > 0.0 && earlier_change < 0.0)
                || (prev_change < 0.0 && earlier_change > 0.0)
            {
                reversals += 1;
            }
        }
        let chop_ratio = if window_len > 0 {
            reversals as f64 / window_len as f64
        } else {
            0.0
        };

        // 종가 변화율의 표본 표준편차 (%)
        let mut pct_changes = Vec::with_capacity(window_len.saturating_sub(1));
        for i in 1..window_len {
            if closes[i - 1] != 0.0 {
                pct_changes.push((closes[i] - closes[i - 1]) / closes[i - 1]);
            }
        }
        let volatility = sample_std(&pct_changes) * 100.0;

        ChopAnalysis {
            volatility,
            chop_ratio,
            is_choppy: chop_ratio > self.config.chop_threshold,
        }
    }
}

/// Wilder 평활 (감쇠 계수 1/period, 단순 평균 시드).
fn wilder_smoothing(data: &[f64], period: usize) -> Vec<f64> {
    let mut smoothed = vec![0.0; data.len()];
    if data.len() < period {
        return smoothed;
    }

    let alpha = 1.0 / period as f64;
    smoothed[period - 1] = data[..period].iter().sum::<f64>() / period as f64;

    for i in period..data.len() {
        smoothed[i] = smoothed[i - 1] * (1.0 - alpha) + data[i] * alpha;
    }

    smoothed
}

/// 표본 표준편차 (n-1 분모).
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() as f64 - 1.0);
    variance.sqrt()
}
