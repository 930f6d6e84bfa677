//! OHLCV 캔들스틱 데이터.

use crate::error::{SignalError, SignalResult};
use crate::types::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들스틱 데이터.
///
/// 캔들 시퀀스는 타임스탬프 오름차순(중복 없음)을 가정하며,
/// 파이프라인 진입 전 [`validate_series`]로 검증됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// 캔들 시퀀스의 순서를 검증합니다.
///
/// 타임스탬프는 엄격하게 증가해야 합니다(중복 금지). 위반 시
/// `SignalError::InvalidInput`으로 즉시 실패합니다.
pub fn validate_series(candles: &[Candle]) -> SignalResult<()> {
    for window in candles.windows(2) {
        if window[1].open_time <= window[0].open_time {
            return Err(SignalError::InvalidInput(format!(
                "캔들 순서 위반: {} 다음에 {}",
                window[0].open_time, window[1].open_time
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn candle_at(minute: u32) -> Candle {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap();
        Candle::new(ts, dec!(100), dec!(101), dec!(99), dec!(100.5), dec!(10))
    }

    #[test]
    fn test_candle_helpers() {
        let candle = candle_at(0);
        assert_eq!(candle.range(), dec!(2));
        assert!(candle.is_bullish());
    }

    #[test]
    fn test_validate_ordered_series() {
        let candles = vec![candle_at(0), candle_at(1), candle_at(2)];
        assert!(validate_series(&candles).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let candles = vec![candle_at(0), candle_at(0)];
        assert!(matches!(
            validate_series(&candles),
            Err(SignalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_order() {
        let candles = vec![candle_at(2), candle_at(1)];
        assert!(validate_series(&candles).is_err());
    }
}
