//! 최적 진입점 탐색.
//!
//! 추세장에서 손익비가 좋은 진입 패턴을 찾습니다: 지지/저항 반응,
//! EMA 되돌림, 돌파, 추세 추종. 박스권에서는 진입하지 않습니다.
//!
//! 전략은 고정 우선순위로 평가되며 첫 번째 매칭이 승리합니다. 손익비가
//! 좋은 패턴(레벨 반응)이 앞, 모멘텀 추종이 뒤입니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use signal_core::{
    Candle, EntryCandidate, EntryType, MarketCondition, PipelineConfig, RewardQuality, Side,
};
use tracing::debug;

use signal_analytics::levels::{is_near_level, nearest_above, nearest_below};
use signal_analytics::{IndicatorSnapshot, LevelDetector, SupportResistance};

/// 진입 탐색에 필요한 최소 캔들 수.
const MIN_ENTRY_CANDLES: usize = 50;

/// 돌파 확인에 참조하는 최근 캔들 수.
const BREAKOUT_LOOKBACK: usize = 10;

/// 돌파 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakDirection {
    Up,
    Down,
}

/// 최적 진입점 탐색기.
#[derive(Debug, Clone)]
pub struct EntryFinder {
    config: PipelineConfig,
    detector: LevelDetector,
}

impl EntryFinder {
    /// 주어진 설정으로 탐색기를 생성합니다.
    pub fn new(config: PipelineConfig) -> Self {
        let detector = LevelDetector::new(config.pivot_window, config.cluster_tolerance_pct);
        Self { config, detector }
    }

    /// 시장 상태에 맞는 진입 후보를 탐색합니다.
    ///
    /// 박스권(RangeBound/VolatileRange)에서는 즉시 NoEntry를 반환합니다.
    /// 상승 추세는 LONG, 하락 추세는 SHORT 후보를 냅니다.
    pub fn find_entry(
        &self,
        condition: MarketCondition,
        snapshot: &IndicatorSnapshot,
        candles: &[Candle],
    ) -> EntryCandidate {
        let entry_price = candles.last().map(|c| c.close).unwrap_or(Decimal::ZERO);

        if candles.len() < MIN_ENTRY_CANDLES {
            return EntryCandidate::no_entry(entry_price, "insufficient_data");
        }

        if !condition.is_tradeable() {
            debug!(condition = %condition, "박스권 - 진입 탐색 생략");
            return EntryCandidate::no_entry(entry_price, "range_bound_market");
        }

        let levels = self.detector.detect(candles, self.config.lookback);

        let candidate = if condition.is_uptrend() {
            self.find_uptrend_entry(snapshot, candles, &levels, entry_price)
        } else {
            self.find_downtrend_entry(snapshot, candles, &levels, entry_price)
        };

        debug!(
            entry_type = %candidate.entry_type,
            reason = %candidate.reason,
            "진입 탐색 결과"
        );

        candidate
    }

    /// 상승 추세 진입 탐색.
    ///
    /// 우선순위: 지지 반등 > EMA20 되돌림 > 저항 돌파 > 추세 추종.
    fn find_uptrend_entry(
        &self,
        snapshot: &IndicatorSnapshot,
        candles: &[Candle],
        levels: &SupportResistance,
        entry_price: Decimal,
    ) -> EntryCandidate {
        let price = snapshot.current_price;
        let rsi = snapshot.rsi;

        // 전략 1: 지지선 반등 (최상의 손익비)
        if let Some(support) = nearest_below(price, &levels.support) {
            if is_near_level(price, support, self.config.sr_tolerance_pct) && support > 0.0 {
                let pullback_pct = (price - support) / support * 100.0;
                if pullback_pct < 2.0 && rsi < 60.0 {
                    return EntryCandidate::new(
                        EntryType::SupportBounce,
                        Side::Long,
                        entry_price,
                        RewardQuality::Excellent,
                        "Bouncing off support in uptrend",
                    )
                    .with_level(to_price(support), pullback_pct);
                }
            }
        }

        // 전략 2: EMA20 되돌림
        if price > snapshot.ema_20 && snapshot.ema_20 > snapshot.ema_50 && snapshot.ema_20 > 0.0 {
            let distance_pct = (price - snapshot.ema_20) / snapshot.ema_20 * 100.0;
            if distance_pct > 0.5 && distance_pct < 3.0 && rsi < 65.0 {
                return EntryCandidate::new(
                    EntryType::Pullback,
                    Side::Long,
                    entry_price,
                    RewardQuality::Good,
                    "Pullback to EMA20 in uptrend",
                )
                .with_level(to_price(snapshot.ema_20), distance_pct);
            }
        }

        // 전략 3: 저항 돌파
        if let Some(resistance) = nearest_above(price, &levels.resistance) {
            if price > 0.0 {
                let distance_pct = (resistance - price) / price * 100.0;
                if distance_pct < 1.0
                    && self.confirmed_breakout(candles, resistance, BreakDirection::Up)
                {
                    return EntryCandidate::new(
                        EntryType::Breakout,
                        Side::Long,
                        entry_price,
                        RewardQuality::Moderate,
                        "Breakout above resistance in uptrend",
                    )
                    .with_level(to_price(resistance), distance_pct);
                }
            }
        }

        // 전략 4: 추세 추종 (모멘텀)
        if rsi > 55.0 && rsi < 70.0 && snapshot.macd_histogram > 0.0 && price > snapshot.ema_20 {
            return EntryCandidate::new(
                EntryType::TrendFollow,
                Side::Long,
                entry_price,
                RewardQuality::Moderate,
                "Trend continuation with momentum",
            );
        }

        EntryCandidate::no_entry(entry_price, "waiting_for_better_setup")
    }

    /// 하락 추세 진입 탐색 (SHORT).
    ///
    /// 상승 전략의 대칭: 저항 거부 > EMA20 아래 되돌림 > 지지 이탈 >
    /// 하락 모멘텀.
    fn find_downtrend_entry(
        &self,
        snapshot: &IndicatorSnapshot,
        candles: &[Candle],
        levels: &SupportResistance,
        entry_price: Decimal,
    ) -> EntryCandidate {
        let price = snapshot.current_price;
        let rsi = snapshot.rsi;

        // 전략 1: 저항선 거부
        if let Some(resistance) = nearest_above(price, &levels.resistance) {
            if is_near_level(price, resistance, self.config.sr_tolerance_pct) && resistance > 0.0 {
                let rejection_pct = (resistance - price) / resistance * 100.0;
                if rejection_pct < 2.0 && rsi > 40.0 {
                    return EntryCandidate::new(
                        EntryType::ResistanceRejection,
                        Side::Short,
                        entry_price,
                        RewardQuality::Excellent,
                        "Rejection at resistance in downtrend",
                    )
                    .with_level(to_price(resistance), rejection_pct);
                }
            }
        }

        // 전략 2: EMA20 아래 되돌림
        if price < snapshot.ema_20 && snapshot.ema_20 < snapshot.ema_50 && price > 0.0 {
            let distance_pct = (snapshot.ema_20 - price) / price * 100.0;
            if distance_pct > 0.5 && distance_pct < 3.0 && rsi > 35.0 {
                return EntryCandidate::new(
                    EntryType::Pullback,
                    Side::Short,
                    entry_price,
                    RewardQuality::Good,
                    "Pullback to EMA20 in downtrend",
                )
                .with_level(to_price(snapshot.ema_20), distance_pct);
            }
        }

        // 전략 3: 지지 이탈
        if let Some(support) = nearest_below(price, &levels.support) {
            if price > 0.0 {
                let distance_pct = (price - support) / price * 100.0;
                if distance_pct < 1.0
                    && self.confirmed_breakout(candles, support, BreakDirection::Down)
                {
                    return EntryCandidate::new(
                        EntryType::Breakout,
                        Side::Short,
                        entry_price,
                        RewardQuality::Moderate,
                        "Breakdown below support in downtrend",
                    )
                    .with_level(to_price(support), distance_pct);
                }
            }
        }

        // 전략 4: 하락 모멘텀
        if rsi < 45.0 && rsi > 30.0 && snapshot.macd_histogram < 0.0 && price < snapshot.ema_20 {
            return EntryCandidate::new(
                EntryType::TrendFollow,
                Side::Short,
                entry_price,
                RewardQuality::Moderate,
                "Downtrend continuation with momentum",
            );
        }

        EntryCandidate::no_entry(entry_price, "waiting_for_better_setup")
    }

    /// 돌파/이탈 확인.
    ///
    /// 최근 10개 캔들 중 마지막 `breakout_confirmation`개의 종가가 모두
    /// 레벨 너머에서 마감했는지 확인합니다.
    fn confirmed_breakout(
        &self,
        candles: &[Candle],
        level: f64,
        direction: BreakDirection,
    ) -> bool {
        let recent_start = candles.len().saturating_sub(BREAKOUT_LOOKBACK);
        let recent = &candles[recent_start..];

        let confirmation = self.config.breakout_confirmation;
        if recent.len() < confirmation || confirmation == 0 {
            return false;
        }

        let mut confirmed = 0usize;
        for candle in &recent[recent.len() - confirmation..] {
            let close = candle.close.to_f64().unwrap_or(0.0);
            let beyond = match direction {
                BreakDirection::Up => close > level,
                BreakDirection::Down => close < level,
            };
            if beyond {
                confirmed += 1;
            }
        }

        confirmed >= confirmation
    }
}

fn to_price(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use signal_core::PipelineConfig;

    fn finder() -> EntryFinder {
        EntryFinder::new(PipelineConfig::default())
    }

    fn candle(i: usize, close: f64) -> Candle {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Candle::new(
            start + Duration::hours(i as i64),
            to_price(close),
            to_price(close + 0.3),
            to_price(close - 0.3),
            to_price(close),
            Decimal::from(1_000_000),
        )
    }

    fn flat_candles(count: usize, close: f64) -> Vec<Candle> {
        (0..count).map(|i| candle(i, close)).collect()
    }

    fn snapshot_with(price: f64) -> IndicatorSnapshot {
        let mut snapshot = IndicatorSnapshot::neutral();
        snapshot.current_price = price;
        snapshot
    }

    #[test]
    fn test_insufficient_data() {
        let candles = flat_candles(30, 100.0);
        let candidate = finder().find_entry(
            MarketCondition::StrongUptrend,
            &snapshot_with(100.0),
            &candles,
        );

        assert_eq!(candidate.entry_type, EntryType::NoEntry);
        assert_eq!(candidate.reason, "insufficient_data");
    }

    #[test]
    fn test_range_bound_is_terminal() {
        let candles = flat_candles(80, 100.0);

        for condition in [MarketCondition::RangeBound, MarketCondition::VolatileRange] {
            let candidate =
                finder().find_entry(condition, &snapshot_with(100.0), &candles);
            assert_eq!(candidate.entry_type, EntryType::NoEntry);
            assert_eq!(candidate.reason, "range_bound_market");
            assert!(candidate.side.is_none());
        }
    }

    #[test]
    fn test_trend_follow_entry() {
        // EMA20 이격 0.2%는 되돌림 구간(0.5~3%) 미달 - 추세 추종으로 낙착
        let candles = flat_candles(80, 100.0);
        let mut snapshot = snapshot_with(100.0);
        snapshot.rsi = 62.0;
        snapshot.macd_histogram = 0.4;
        snapshot.ema_20 = 99.8;
        snapshot.ema_50 = 98.0;

        let candidate =
            finder().find_entry(MarketCondition::WeakUptrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::TrendFollow);
        assert_eq!(candidate.side, Some(Side::Long));
        assert_eq!(candidate.quality, Some(RewardQuality::Moderate));
    }

    #[test]
    fn test_pullback_beats_trend_follow() {
        // 되돌림 조건과 추세 추종 조건이 동시에 성립하면 되돌림이 우선
        let candles = flat_candles(80, 100.0);
        let mut snapshot = snapshot_with(100.0);
        snapshot.rsi = 58.0;
        snapshot.macd_histogram = 0.4;
        snapshot.ema_20 = 98.5; // 이격 1.52%
        snapshot.ema_50 = 96.0;

        let candidate =
            finder().find_entry(MarketCondition::WeakUptrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::Pullback);
        assert_eq!(candidate.side, Some(Side::Long));
    }

    #[test]
    fn test_overbought_uptrend_waits() {
        // RSI 75: 되돌림(<65)도 추세 추종(<70)도 불가
        let candles = flat_candles(80, 100.0);
        let mut snapshot = snapshot_with(100.0);
        snapshot.rsi = 75.0;
        snapshot.macd_histogram = 0.4;
        snapshot.ema_20 = 98.5;
        snapshot.ema_50 = 96.0;

        let candidate =
            finder().find_entry(MarketCondition::StrongUptrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::NoEntry);
        assert_eq!(candidate.reason, "waiting_for_better_setup");
    }

    #[test]
    fn test_downtrend_momentum_entry() {
        // EMA20 이격 0.3%는 되돌림 구간 미달 - 하락 모멘텀으로 낙착
        let candles = flat_candles(80, 100.0);
        let mut snapshot = snapshot_with(100.0);
        snapshot.rsi = 38.0;
        snapshot.macd_histogram = -0.4;
        snapshot.ema_20 = 100.3;
        snapshot.ema_50 = 102.0;

        let candidate =
            finder().find_entry(MarketCondition::WeakDowntrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::TrendFollow);
        assert_eq!(candidate.side, Some(Side::Short));
    }

    #[test]
    fn test_downtrend_pullback_entry() {
        let candles = flat_candles(80, 100.0);
        let mut snapshot = snapshot_with(100.0);
        snapshot.rsi = 42.0;
        snapshot.macd_histogram = -0.2;
        snapshot.ema_20 = 101.5; // 아래 되돌림 1.5%
        snapshot.ema_50 = 104.0;

        let candidate =
            finder().find_entry(MarketCondition::StrongDowntrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::Pullback);
        assert_eq!(candidate.side, Some(Side::Short));
        assert_eq!(candidate.quality, Some(RewardQuality::Good));
    }

    #[test]
    fn test_support_bounce_entry() {
        // 인덱스 40에 피벗 저점 99.0을 심고 현재가를 그 근처에 둠
        let mut candles: Vec<Candle> = (0..80)
            .map(|i| {
                if i == 40 {
                    let mut c = candle(i, 100.3);
                    c.low = to_price(99.0);
                    c
                } else {
                    candle(i, 100.3 + (i as f64 * 0.002))
                }
            })
            .collect();
        // 마지막 캔들을 지지선 1% 이내로
        let last_index = candles.len() - 1;
        candles[last_index] = candle(last_index, 99.5);

        let mut snapshot = snapshot_with(99.5);
        snapshot.rsi = 48.0;

        let candidate =
            finder().find_entry(MarketCondition::WeakUptrend, &snapshot, &candles);

        assert_eq!(candidate.entry_type, EntryType::SupportBounce);
        assert_eq!(candidate.side, Some(Side::Long));
        assert_eq!(candidate.quality, Some(RewardQuality::Excellent));
        assert!(candidate.level.is_some());
    }

    #[test]
    fn test_breakout_requires_confirmation_closes() {
        let config = PipelineConfig::default();
        let finder = EntryFinder::new(config);

        // 인덱스 40에 피벗 고점 105.0, 마지막 2개 캔들이 그 위에서 마감
        let mut candles: Vec<Candle> = (0..80)
            .map(|i| {
                if i == 40 {
                    let mut c = candle(i, 104.0);
                    c.high = to_price(105.0);
                    c
                } else {
                    candle(i, 104.0 - (40 - i as i64).abs() as f64 * 0.002)
                }
            })
            .collect();
        let n = candles.len();
        candles[n - 2] = candle(n - 2, 105.2);
        candles[n - 1] = candle(n - 1, 105.3);

        // 마지막 2개 종가가 레벨 위에서 마감해야 확인됨
        assert!(finder.confirmed_breakout(&candles, 105.0, BreakDirection::Up));
        assert!(!finder.confirmed_breakout(&candles, 106.0, BreakDirection::Up));
        assert!(finder.confirmed_breakout(&candles, 104.0, BreakDirection::Up));
        assert!(!finder.confirmed_breakout(&candles, 104.0, BreakDirection::Down));
    }
}
