//! 지표 스냅샷.
//!
//! 캔들 시퀀스의 마지막 캔들 기준으로 파생된 지표 값 일체를 담습니다.
//! 호출마다 전체 윈도우에서 새로 계산되며, 증분/스트리밍 상태는
//! 유지하지 않습니다.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use signal_core::Candle;
use tracing::warn;

use super::trend::{EmaParams, MacdParams};
use super::volatility::{AtrParams, BollingerBandsParams};
use super::{IndicatorEngine, RsiParams};

/// 스냅샷 계산에 필요한 최소 캔들 수.
pub const MIN_SNAPSHOT_CANDLES: usize = 50;

/// 파생 비율 계산에 사용하는 참조 윈도우.
const SHORT_CHANGE_WINDOW: usize = 5;
const LONG_CHANGE_WINDOW: usize = 20;
const VOLUME_WINDOW: usize = 20;
const RECENT_EXTREME_WINDOW: usize = 20;

/// 마지막 캔들 기준 지표 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// RSI(14)
    pub rsi: f64,
    /// MACD 라인 (12, 26)
    pub macd: f64,
    /// MACD 시그널 라인 (9)
    pub macd_signal: f64,
    /// MACD 히스토그램
    pub macd_histogram: f64,
    /// EMA(20)
    pub ema_20: f64,
    /// EMA(50)
    pub ema_50: f64,
    /// EMA(200)
    pub ema_200: f64,
    /// 볼린저 상단 밴드 (20, 2σ)
    pub bb_upper: f64,
    /// 볼린저 중간 밴드
    pub bb_middle: f64,
    /// 볼린저 하단 밴드
    pub bb_lower: f64,
    /// ATR(14)
    pub atr: f64,
    /// 거래량 변화율 (%) - 마지막 거래량 vs 20캔들 평균
    pub volume_change_pct: f64,
    /// 단기 가격 변화율 (%) - 5캔들
    pub price_change_short_pct: f64,
    /// 장기 가격 변화율 (%) - 20캔들
    pub price_change_long_pct: f64,
    /// 최근 저점까지의 거리 (%)
    pub support_distance_pct: f64,
    /// 최근 고점까지의 거리 (%)
    pub resistance_distance_pct: f64,
    /// 추세 강도 점수 [0, 100]
    pub trend_strength: f64,
    /// 거래량 프로파일 - 마지막 거래량 / 20캔들 평균
    pub volume_profile: f64,
    /// 변동성 (%) - ATR을 가격으로 정규화
    pub volatility_pct: f64,
    /// 현재가 (마지막 종가)
    pub current_price: f64,
    /// 최근 20캔들 고점
    pub recent_high: f64,
    /// 최근 20캔들 저점
    pub recent_low: f64,
}

impl IndicatorSnapshot {
    /// 정의된 중립 기본 스냅샷.
    ///
    /// 데이터 부족 또는 계산 불능 시 반환됩니다. RSI는 중립 50,
    /// 거래량 프로파일은 1.0, 나머지는 전부 0.0입니다.
    pub fn neutral() -> Self {
        Self {
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_histogram: 0.0,
            ema_20: 0.0,
            ema_50: 0.0,
            ema_200: 0.0,
            bb_upper: 0.0,
            bb_middle: 0.0,
            bb_lower: 0.0,
            atr: 0.0,
            volume_change_pct: 0.0,
            price_change_short_pct: 0.0,
            price_change_long_pct: 0.0,
            support_distance_pct: 0.0,
            resistance_distance_pct: 0.0,
            trend_strength: 0.0,
            volume_profile: 1.0,
            volatility_pct: 0.0,
            current_price: 0.0,
            recent_high: 0.0,
            recent_low: 0.0,
        }
    }

    /// EMA 정배열(강세) 여부.
    pub fn bullish_alignment(&self) -> bool {
        self.ema_20 > self.ema_50 && self.ema_50 > self.ema_200
    }

    /// EMA 역배열(약세) 여부.
    pub fn bearish_alignment(&self) -> bool {
        self.ema_20 < self.ema_50 && self.ema_50 < self.ema_200
    }
}

fn to_f64(value: rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

impl IndicatorEngine {
    /// 캔들 시퀀스에서 지표 스냅샷을 계산합니다.
    ///
    /// 전함수입니다: 캔들이 50개 미만이거나 내부 계산이 정의되지 않는
    /// 경우(EMA(200) 미충족 구간 포함, 0 분모 등) 에러 대신
    /// [`IndicatorSnapshot::neutral`]을 반환합니다.
    pub fn snapshot(&self, candles: &[Candle]) -> IndicatorSnapshot {
        if candles.len() < MIN_SNAPSHOT_CANDLES {
            warn!(
                provided = candles.len(),
                required = MIN_SNAPSHOT_CANDLES,
                "데이터 부족 - 중립 스냅샷 반환"
            );
            return IndicatorSnapshot::neutral();
        }

        let closes: Vec<f64> = candles.iter().map(|c| to_f64(c.close)).collect();
        let highs: Vec<f64> = candles.iter().map(|c| to_f64(c.high)).collect();
        let lows: Vec<f64> = candles.iter().map(|c| to_f64(c.low)).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| to_f64(c.volume)).collect();

        match self.try_snapshot(&closes, &highs, &lows, &volumes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "지표 계산 불능 - 중립 스냅샷 반환");
                IndicatorSnapshot::neutral()
            }
        }
    }

    fn try_snapshot(
        &self,
        closes: &[f64],
        highs: &[f64],
        lows: &[f64],
        volumes: &[f64],
    ) -> super::IndicatorResult<IndicatorSnapshot> {
        let n = closes.len();
        let current_price = closes[n - 1];

        let rsi = self.rsi(closes, RsiParams::default())?;
        let macd = self.macd(closes, MacdParams::default())?;
        let ema_20 = self.ema(closes, EmaParams { period: 20 })?;
        let ema_50 = self.ema(closes, EmaParams { period: 50 })?;
        let ema_200 = self.ema(closes, EmaParams { period: 200 })?;
        let bands = self.bollinger_bands(closes, BollingerBandsParams::default())?;
        let atr = self.atr(highs, lows, closes, AtrParams::default())?;

        // 거래량: 마지막 값 vs 20캔들 평균 (평균 0이면 변화율 0, 프로파일 1.0)
        let volume_ma =
            volumes[n - VOLUME_WINDOW..].iter().sum::<f64>() / VOLUME_WINDOW as f64;
        let (volume_change_pct, volume_profile) = if volume_ma > 0.0 {
            (
                (volumes[n - 1] - volume_ma) / volume_ma * 100.0,
                volumes[n - 1] / volume_ma,
            )
        } else {
            (0.0, 1.0)
        };

        // 가격 변화율 (분모 0이면 0)
        let price_change_short_pct = pct_change(closes[n - SHORT_CHANGE_WINDOW], current_price);
        let price_change_long_pct = pct_change(closes[n - LONG_CHANGE_WINDOW], current_price);

        // 최근 극값 대비 거리
        let recent_high = highs[n - RECENT_EXTREME_WINDOW..]
            .iter()
            .fold(f64::MIN, |a, &b| a.max(b));
        let recent_low = lows[n - RECENT_EXTREME_WINDOW..]
            .iter()
            .fold(f64::MAX, |a, &b| a.min(b));
        let support_distance_pct = if recent_low > 0.0 {
            (current_price - recent_low) / recent_low * 100.0
        } else {
            0.0
        };
        let resistance_distance_pct = if current_price > 0.0 {
            (recent_high - current_price) / current_price * 100.0
        } else {
            0.0
        };

        let ema20_last = ema_20[n - 1];
        let ema50_last = ema_50[n - 1];
        let ema200_last = ema_200[n - 1];
        let trend_strength = self
            .trend
            .trend_strength(current_price, ema20_last, ema50_last, ema200_last);

        let atr_last = atr[n - 1];
        let volatility_pct = if current_price > 0.0 {
            atr_last / current_price * 100.0
        } else {
            0.0
        };

        Ok(IndicatorSnapshot {
            rsi: rsi[n - 1],
            macd: macd.line[n - 1],
            macd_signal: macd.signal[n - 1],
            macd_histogram: macd.histogram[n - 1],
            ema_20: ema20_last,
            ema_50: ema50_last,
            ema_200: ema200_last,
            bb_upper: bands.upper[n - 1],
            bb_middle: bands.middle[n - 1],
            bb_lower: bands.lower[n - 1],
            atr: atr_last,
            volume_change_pct,
            price_change_short_pct,
            price_change_long_pct,
            support_distance_pct,
            resistance_distance_pct,
            trend_strength,
            volume_profile,
            volatility_pct,
            current_price,
            recent_high,
            recent_low,
        })
    }
}

fn pct_change(base: f64, current: f64) -> f64 {
    if base != 0.0 {
        (current - base) / base * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    /// 결정적 테스트 캔들 생성 (RNG 없음).
    fn build_candles(count: usize, base_price: f64, trend: f64) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let variation = (i as f64 * 0.3).sin() * 0.03 + 1.0;
                let price = (base_price + i as f64 * trend) * variation;
                let daily_range = price * 0.02;
                Candle::new(
                    start + Duration::hours(i as i64),
                    Decimal::from_f64_retain(price - daily_range / 2.0).unwrap(),
                    Decimal::from_f64_retain(price + daily_range).unwrap(),
                    Decimal::from_f64_retain(price - daily_range).unwrap(),
                    Decimal::from_f64_retain(price).unwrap(),
                    Decimal::from((900_000 + i * 10_000) as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_short_series_returns_exact_neutral() {
        let engine = IndicatorEngine::new();
        for count in [0, 1, 10, 49] {
            let candles = build_candles(count, 100.0, 0.1);
            assert_eq!(engine.snapshot(&candles), IndicatorSnapshot::neutral());
        }
    }

    #[test]
    fn test_ema200_shortfall_degrades_to_neutral() {
        let engine = IndicatorEngine::new();
        // 50개 이상이지만 EMA(200) 시드에 못 미치면 계산 불능으로 중립
        let candles = build_candles(120, 100.0, 0.1);
        assert_eq!(engine.snapshot(&candles), IndicatorSnapshot::neutral());
    }

    #[test]
    fn test_full_series_snapshot() {
        let engine = IndicatorEngine::new();
        let candles = build_candles(250, 100.0, 0.2);

        let snapshot = engine.snapshot(&candles);

        assert_ne!(snapshot, IndicatorSnapshot::neutral());
        assert!((0.0..=100.0).contains(&snapshot.rsi));
        assert!((0.0..=100.0).contains(&snapshot.trend_strength));
        assert!(snapshot.current_price > 0.0);
        assert!(snapshot.recent_high >= snapshot.current_price * 0.5);
        assert!(snapshot.recent_low <= snapshot.recent_high);
        assert!(snapshot.atr > 0.0);
        assert!(snapshot.volatility_pct > 0.0);
        // 상승 추세 - 장기 변화율 양수
        assert!(snapshot.price_change_long_pct > 0.0);
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let engine = IndicatorEngine::new();
        let candles = build_candles(250, 100.0, 0.2);

        let first = engine.snapshot(&candles);
        let second = engine.snapshot(&candles);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_volume_fallbacks() {
        let engine = IndicatorEngine::new();
        let mut candles = build_candles(250, 100.0, 0.2);
        for candle in &mut candles {
            candle.volume = Decimal::ZERO;
        }

        let snapshot = engine.snapshot(&candles);
        assert_eq!(snapshot.volume_change_pct, 0.0);
        assert_eq!(snapshot.volume_profile, 1.0);
    }
}
