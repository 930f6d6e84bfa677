//! 손절/익절 가격 사다리.
//!
//! 손절 거리의 고정 배수(1.5배, 3.0배, 4.5배)로 익절 3단을 배치합니다.
//! LONG은 진입가 위로, SHORT는 아래로 전개됩니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signal_core::{Price, Side};

/// 익절 보상 배수 (손절 거리 기준).
const REWARD_MULTIPLES: [Decimal; 3] = [dec!(1.5), dec!(3.0), dec!(4.5)];

/// 손절/익절 가격 사다리.
///
/// 가격은 반올림 없이 전체 정밀도로 유지됩니다. 표시용 반올림은
/// 소비자의 몫이며, 저가 종목에서 사다리 순서가 무너지지 않게 합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLadder {
    /// 손절가
    pub stop_loss: Price,
    /// 1차 익절가 (1.5R)
    pub take_profit_1: Price,
    /// 2차 익절가 (3.0R)
    pub take_profit_2: Price,
    /// 3차 익절가 (4.5R)
    pub take_profit_3: Price,
}

impl PriceLadder {
    /// 진입가와 손절 비율로 사다리를 계산합니다.
    ///
    /// LONG: 손절은 진입가 아래, 익절은 위.
    /// SHORT: 손절은 진입가 위, 익절은 아래.
    pub fn compute(entry_price: Price, side: Side, stop_loss_pct: f64) -> Self {
        let pct = pct_to_decimal(stop_loss_pct) / dec!(100);

        match side {
            Side::Long => Self {
                stop_loss: entry_price * (Decimal::ONE - pct),
                take_profit_1: entry_price * (Decimal::ONE + pct * REWARD_MULTIPLES[0]),
                take_profit_2: entry_price * (Decimal::ONE + pct * REWARD_MULTIPLES[1]),
                take_profit_3: entry_price * (Decimal::ONE + pct * REWARD_MULTIPLES[2]),
            },
            Side::Short => Self {
                stop_loss: entry_price * (Decimal::ONE + pct),
                take_profit_1: entry_price * (Decimal::ONE - pct * REWARD_MULTIPLES[0]),
                take_profit_2: entry_price * (Decimal::ONE - pct * REWARD_MULTIPLES[1]),
                take_profit_3: entry_price * (Decimal::ONE - pct * REWARD_MULTIPLES[2]),
            },
        }
    }
}

/// f64 퍼센트를 소수점 4자리 정밀도의 Decimal로 변환합니다.
pub(crate) fn pct_to_decimal(pct: f64) -> Decimal {
    Decimal::from((pct * 10_000.0).round() as i64) / Decimal::from(10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_ladder_exact_levels() {
        let ladder = PriceLadder::compute(dec!(100), Side::Long, 1.0);

        assert_eq!(ladder.stop_loss, dec!(99.0));
        assert_eq!(ladder.take_profit_1, dec!(101.5));
        assert_eq!(ladder.take_profit_2, dec!(103.0));
        assert_eq!(ladder.take_profit_3, dec!(104.5));
    }

    #[test]
    fn test_short_ladder_exact_levels() {
        let ladder = PriceLadder::compute(dec!(100), Side::Short, 2.0);

        assert_eq!(ladder.stop_loss, dec!(102.0));
        assert_eq!(ladder.take_profit_1, dec!(97.0));
        assert_eq!(ladder.take_profit_2, dec!(94.0));
        assert_eq!(ladder.take_profit_3, dec!(91.0));
    }

    #[test]
    fn test_reward_multiples_exact() {
        let entry = dec!(250);
        let ladder = PriceLadder::compute(entry, Side::Long, 1.5);
        let stop_distance = entry - ladder.stop_loss;

        assert_eq!(ladder.take_profit_1 - entry, stop_distance * dec!(1.5));
        assert_eq!(ladder.take_profit_2 - entry, stop_distance * dec!(3.0));
        assert_eq!(ladder.take_profit_3 - entry, stop_distance * dec!(4.5));
    }

    #[test]
    fn test_sub_dollar_ladder_keeps_ordering() {
        // 저가 종목에서도 반올림 없이 순서가 유지되어야 함
        let ladder = PriceLadder::compute(dec!(0.42), Side::Long, 1.0);

        assert!(ladder.stop_loss < dec!(0.42));
        assert!(dec!(0.42) < ladder.take_profit_1);
        assert!(ladder.take_profit_1 < ladder.take_profit_2);
        assert!(ladder.take_profit_2 < ladder.take_profit_3);
    }
}
