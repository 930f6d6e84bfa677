//! 신뢰도 게이트.
//!
//! 지표 스냅샷을 고정 피처 벡터로 축약해 주입된 스코어러에 넘기고,
//! 반환된 신뢰도로 진입 후보를 수락/거절합니다.
//!
//! 스코어러는 불투명한 교체 가능 능력입니다. 인터페이스를 만족하는
//! 어떤 단조 분류기든 유효하며, 파이프라인 정합성 테스트는 결정적
//! 스텁 스코어러로 수행합니다. 스코어러가 평가 불능이면 해당 호출은
//! 실패합니다 - 파이프라인은 신뢰도를 임의로 만들어내지 않습니다.

mod features;

pub use features::{FeatureVector, FEATURE_COUNT};

use signal_core::PipelineConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::indicators::IndicatorSnapshot;

/// 신뢰도 게이트 에러.
#[derive(Debug, Error)]
pub enum ConfirmError {
    /// 스코어러 평가 불능 - 해당 호출은 치명적으로 실패합니다
    #[error("Scorer unavailable: {0}")]
    ScorerUnavailable(String),

    /// 피처 벡터 차원 불일치
    #[error("Invalid feature vector: expected {expected} features, got {actual}")]
    InvalidInput { expected: usize, actual: usize },
}

/// 신뢰도 스코어러 능력.
///
/// # 계약
///
/// - 10차원 피처 벡터를 받아 [0, 1] 범위 신뢰도를 반환합니다.
/// - 동기적이며, 같은 입력에 대해 결정적이어야 합니다
///   (무작위 스코어러는 재현성 테스트를 깨뜨립니다).
pub trait ConfidenceScorer: Send + Sync {
    /// 피처 벡터를 평가해 신뢰도를 반환합니다.
    fn score(&self, features: &FeatureVector) -> Result<f32, ConfirmError>;
}

/// 게이트 판정 결과.
#[derive(Debug, Clone, Copy)]
pub struct GateDecision {
    /// 수락 여부
    pub confirmed: bool,
    /// 스코어러가 반환한 신뢰도
    pub confidence: f32,
}

/// 신뢰도 게이트.
///
/// 스코어러 자체 임계값(기본 0.75)과 파이프라인 최소 게이트(기본
/// 0.70)를 모두 넘어야 수락합니다 - 실질적으로는 더 엄격한 쪽이
/// 지배합니다.
#[derive(Clone)]
pub struct ConfidenceGate {
    scorer: Arc<dyn ConfidenceScorer>,
    confidence_threshold: f32,
    min_confidence: f32,
}

impl ConfidenceGate {
    /// 스코어러와 설정으로 게이트를 생성합니다.
    pub fn new(scorer: Arc<dyn ConfidenceScorer>, config: &PipelineConfig) -> Self {
        Self {
            scorer,
            confidence_threshold: config.confidence_threshold,
            min_confidence: config.min_confidence,
        }
    }

    /// 스냅샷을 평가해 수락/거절을 판정합니다.
    pub fn confirm(&self, snapshot: &IndicatorSnapshot) -> Result<GateDecision, ConfirmError> {
        let features = FeatureVector::from_snapshot(snapshot);
        let confidence = self.scorer.score(&features)?;

        let confirmed =
            confidence >= self.confidence_threshold && confidence >= self.min_confidence;

        debug!(
            confidence = confidence,
            threshold = self.confidence_threshold,
            confirmed = confirmed,
            "신뢰도 게이트 판정"
        );

        Ok(GateDecision {
            confirmed,
            confidence,
        })
    }
}

/// 고정 가중치 로지스틱 스코어러.
///
/// 교체 가능한 기본 구현입니다. 실서비스에서는 학습된 모델을 같은
/// 트레이트 뒤에 주입합니다. 가중치가 고정이므로 결정적입니다.
#[derive(Debug, Clone)]
pub struct LinearScorer {
    weights: [f32; FEATURE_COUNT],
    bias: f32,
}

impl Default for LinearScorer {
    fn default() -> Self {
        // 추세 강도/모멘텀을 우대하고 변동성을 감점하는 보수적 가중치
        Self {
            weights: [
                0.8,    // rsi (정규화)
                0.6,    // macd
                -0.3,   // macd signal
                0.004,  // volume change %
                0.05,   // price change short %
                0.02,   // price change long %
                -0.08,  // volatility %
                0.01,   // support/resistance distance %
                0.02,   // trend strength
                0.3,    // volume profile
            ],
            bias: -2.0,
        }
    }
}

impl LinearScorer {
    /// 명시적 가중치로 스코어러를 생성합니다.
    pub fn new(weights: [f32; FEATURE_COUNT], bias: f32) -> Self {
        Self { weights, bias }
    }
}

impl ConfidenceScorer for LinearScorer {
    fn score(&self, features: &FeatureVector) -> Result<f32, ConfirmError> {
        if features.len() != FEATURE_COUNT {
            return Err(ConfirmError::InvalidInput {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let logit: f32 = features
            .as_slice()
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f32>()
            + self.bias;

        Ok(1.0 / (1.0 + (-logit).exp()))
    }
}
