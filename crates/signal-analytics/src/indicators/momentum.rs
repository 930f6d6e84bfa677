//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표를 제공합니다.
//! - RSI (Relative Strength Index, Wilder 평활)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// Wilder 방식: 첫 `period`개 델타의 단순 평균으로 시드하고, 이후
    /// `avg[i] = (avg[i-1] * (period-1) + value[i-1]) / period` 점화식으로
    /// 평활합니다.
    ///
    /// # 엣지 정책
    ///
    /// 평균 하락폭이 0이면 RS를 0으로 간주하여 RSI가 0이 됩니다.
    /// 100으로 기본값을 주는 관행 대신 0 폴백을 채택한 것이며, 하락폭
    /// 없는 구간에서 과매수 판정이 나오지 않게 합니다. 처음 `period`개
    /// 값은 중립 50으로 채워집니다.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<f64>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let n = prices.len();

        // 가격 변화를 상승/하락으로 분리 (델타 길이 n-1)
        let mut gains = Vec::with_capacity(n - 1);
        let mut losses = Vec::with_capacity(n - 1);
        for i in 1..n {
            let delta = prices[i] - prices[i - 1];
            gains.push(if delta > 0.0 { delta } else { 0.0 });
            losses.push(if delta < 0.0 { -delta } else { 0.0 });
        }

        let mut avg_gain = vec![0.0; n];
        let mut avg_loss = vec![0.0; n];

        // 첫 period개 델타의 단순 평균으로 시드
        avg_gain[period] = gains[..period].iter().sum::<f64>() / period as f64;
        avg_loss[period] = losses[..period].iter().sum::<f64>() / period as f64;

        // Wilder 평활
        for i in period + 1..n {
            avg_gain[i] = (avg_gain[i - 1] * (period as f64 - 1.0) + gains[i - 1]) / period as f64;
            avg_loss[i] = (avg_loss[i - 1] * (period as f64 - 1.0) + losses[i - 1]) / period as f64;
        }

        let mut result = vec![50.0; n];
        for i in period..n {
            let rs = if avg_loss[i] != 0.0 {
                avg_gain[i] / avg_loss[i]
            } else {
                0.0
            };
            result[i] = 100.0 - (100.0 / (1.0 + rs));
        }

        Ok(result)
    }
}
