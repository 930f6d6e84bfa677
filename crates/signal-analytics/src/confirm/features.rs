//! 스코어러 입력을 위한 피처 벡터.

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;

/// 스코어러가 기대하는 피처 차원.
pub const FEATURE_COUNT: usize = 10;

/// 피처 이름 (디버깅/로깅용, 벡터 순서와 동일).
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "rsi",
    "macd",
    "macd_signal",
    "volume_change",
    "price_change_short",
    "price_change_long",
    "volatility",
    "support_resistance",
    "trend_strength",
    "volume_profile",
];

/// 스코어러 입력용 고정 순서 피처 벡터.
///
/// 순서는 [`FEATURE_NAMES`]와 같으며, RSI만 [0, 1]로 정규화되고
/// 나머지는 스냅샷 값을 그대로 사용합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// 값으로부터 피처 벡터를 생성합니다.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// 지표 스냅샷에서 피처 벡터를 추출합니다.
    pub fn from_snapshot(snapshot: &IndicatorSnapshot) -> Self {
        Self {
            values: vec![
                (snapshot.rsi / 100.0) as f32,
                snapshot.macd as f32,
                snapshot.macd_signal as f32,
                snapshot.volume_change_pct as f32,
                snapshot.price_change_short_pct as f32,
                snapshot.price_change_long_pct as f32,
                snapshot.volatility_pct as f32,
                snapshot.support_distance_pct as f32,
                snapshot.trend_strength as f32,
                snapshot.volume_profile as f32,
            ],
        }
    }

    /// 피처 값을 슬라이스로 반환합니다.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// 피처 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 피처 벡터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
