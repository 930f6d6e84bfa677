//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (모집단 표준편차)
//! - ATR (Average True Range)

use serde::{Deserialize, Serialize};

use super::trend::{EmaParams, TrendIndicators};
use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_multiplier: 2.0,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 볼린저 밴드 결과 시리즈.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    /// 상단 밴드.
    pub upper: Vec<f64>,
    /// 중간 밴드 (SMA).
    pub middle: Vec<f64>,
    /// 하단 밴드.
    pub lower: Vec<f64>,
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = 기간 SMA, 상단/하단 = SMA ± (배수 × 모집단 표준편차).
    /// 처음 `period-1`개는 워밍업 구간으로 0.0입니다.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<BollingerSeries> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let n = prices.len();
        let mut upper = vec![0.0; n];
        let mut middle = vec![0.0; n];
        let mut lower = vec![0.0; n];

        for i in period - 1..n {
            let window = &prices[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance =
                window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
            let std_dev = variance.sqrt();

            middle[i] = mean;
            upper[i] = mean + std_dev * params.std_multiplier;
            lower[i] = mean - std_dev * params.std_multiplier;
        }

        Ok(BollingerSeries {
            upper,
            middle,
            lower,
        })
    }

    /// ATR (Average True Range) 계산.
    ///
    /// TR = max(고가-저가, |고가-이전종가|, |저가-이전종가|), TR[0] = 0.
    /// TR 시리즈를 EMA 시드 규약으로 평활한 뒤, 처음 `period`개는 첫
    /// `period`개 TR의 단순 평균으로 채웁니다.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<f64>> {
        let period = params.period;
        let n = high.len().min(low.len()).min(close.len());

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if n < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: n,
            });
        }

        let mut tr = vec![0.0; n];
        for i in 1..n {
            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            tr[i] = hl.max(hc).max(lc);
        }

        let trend = TrendIndicators::new();
        let mut atr = trend.ema(&tr, EmaParams { period })?;

        let seed = tr[..period].iter().sum::<f64>() / period as f64;
        for value in atr.iter_mut().take(period) {
            *value = seed;
        }

        Ok(atr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_constant_series() {
        let volatility = VolatilityIndicators::new();
        let prices = vec![100.0; 30];

        let bands = volatility
            .bollinger_bands(&prices, BollingerBandsParams::default())
            .unwrap();

        // 상수 시리즈에서는 세 밴드가 모두 가격과 같음
        assert_eq!(bands.upper[25], 100.0);
        assert_eq!(bands.middle[25], 100.0);
        assert_eq!(bands.lower[25], 100.0);
    }

    #[test]
    fn test_bollinger_band_ordering() {
        let volatility = VolatilityIndicators::new();
        let prices: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();

        let bands = volatility
            .bollinger_bands(&prices, BollingerBandsParams::default())
            .unwrap();

        for i in 19..prices.len() {
            assert!(bands.upper[i] >= bands.middle[i]);
            assert!(bands.middle[i] >= bands.lower[i]);
        }
    }

    #[test]
    fn test_atr_warmup_is_tr_mean() {
        let volatility = VolatilityIndicators::new();
        let n = 30;
        let high: Vec<f64> = (0..n).map(|i| 102.0 + i as f64).collect();
        let low: Vec<f64> = (0..n).map(|i| 98.0 + i as f64).collect();
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();

        let atr = volatility
            .atr(&high, &low, &close, AtrParams { period: 14 })
            .unwrap();

        // TR[0] = 0, TR[i>=1] = max(4, |h-pc|=3, |l-pc|=1) = 4
        let expected_seed = (0.0 + 4.0 * 13.0) / 14.0;
        for value in &atr[..14] {
            assert!((value - expected_seed).abs() < 1e-9);
        }
        // 평활 이후 TR 4.0으로 수렴
        assert!((atr.last().unwrap() - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_atr_positive() {
        let volatility = VolatilityIndicators::new();
        let high: Vec<f64> = (0..30).map(|i| 105.0 + (i as f64 * 0.3).cos()).collect();
        let low: Vec<f64> = (0..30).map(|i| 95.0 - (i as f64 * 0.3).sin()).collect();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();

        let atr = volatility
            .atr(&high, &low, &close, AtrParams::default())
            .unwrap();

        for value in atr {
            assert!(value >= 0.0);
        }
    }
}
