//! 기술적 지표 모듈.
//!
//! 시그널 파이프라인에서 사용되는 기술적 지표를 제공합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균
//! - **MACD**: 이동평균 수렴/확산
//! - **추세 강도 점수**: EMA 정배열 기반 [0, 100] 점수
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활)
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드
//! - **ATR**: 평균 실제 범위
//!
//! 커널은 `f64` 슬라이스 위에서 동작하며 입력과 같은 길이의 벡터를
//! 반환합니다. 워밍업 구간의 값은 각 지표가 정의한 방식(0.0, 중립 50,
//! 초기 평균)으로 채워지고, 소비자는 마지막 원소만 읽습니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use signal_analytics::indicators::{IndicatorEngine, EmaParams, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//!
//! // 개별 커널
//! let ema = engine.ema(&closes, EmaParams { period: 20 })?;
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//!
//! // 전체 스냅샷 (연성 실패 - 에러 대신 중립 기본값)
//! let snapshot = engine.snapshot(&candles);
//! ```

pub mod momentum;
pub mod snapshot;
pub mod trend;
pub mod volatility;

use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use snapshot::IndicatorSnapshot;
pub use trend::{EmaParams, MacdParams, MacdSeries, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerSeries, VolatilityIndicators};

/// 지표 계산 오류.
///
/// 원시 커널에서만 발생합니다. [`IndicatorEngine::snapshot`]은 모든
/// 커널 오류를 중립 기본값으로 흡수하는 전함수입니다.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
/// 호출 간 상태를 유지하지 않으며, 매 호출마다 전달된 윈도우 전체에서
/// 새로 계산합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// `period-1` 인덱스에서 첫 `period`개 값의 단순 평균으로 시드하고,
    /// 이후 `k = 2/(period+1)` 승수로 갱신합니다.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.ema(prices, params)
    }

    /// MACD (Moving Average Convergence Divergence) 계산.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<MacdSeries> {
        self.trend.macd(prices, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI (Relative Strength Index) 계산.
    ///
    /// 0-100 사이의 RSI 값들. 처음 `period`개는 중립 50으로 채워집니다.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<f64>> {
        self.momentum.rsi(prices, params)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<BollingerSeries> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// ATR (Average True Range) 계산.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<f64>> {
        self.volatility.atr(high, low, close, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<f64> {
        vec![
            100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0, 111.0, 110.0,
            112.0, 114.0, 113.0, 115.0,
        ]
    }

    #[test]
    fn test_sma_calculation() {
        let engine = IndicatorEngine::new();
        let prices = sample_prices();

        let sma = engine.sma(&prices, SmaParams { period: 5 }).unwrap();

        assert_eq!(sma.len(), prices.len());
        // 처음 4개는 워밍업 (0.0)
        assert_eq!(sma[3], 0.0);
        // 5번째부터 값이 있어야 함
        assert_eq!(sma[4], (100.0 + 102.0 + 101.0 + 103.0 + 105.0) / 5.0);
    }

    #[test]
    fn test_rsi_bounded() {
        let engine = IndicatorEngine::new();
        let prices = sample_prices();

        let rsi = engine.rsi(&prices, RsiParams { period: 14 }).unwrap();

        for value in rsi {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_insufficient_data_error() {
        let engine = IndicatorEngine::new();
        let prices = vec![100.0, 101.0];

        let result = engine.sma(&prices, SmaParams { period: 20 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 20, provided: 2 })
        ));
    }
}
