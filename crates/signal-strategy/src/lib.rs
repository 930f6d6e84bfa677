//! 진입 전략 엔진 및 시그널 파이프라인.
//!
//! 이 크레이트가 제공하는 기능:
//! - 추세 조건부 진입 패턴 탐색 (지지 반등, 되돌림, 돌파, 추세 추종)
//! - 필터 체인 방식의 시그널 파이프라인 엔진
//! - 캔들 리플레이 기반 시그널 결과 판정
//!
//! # 예제
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use signal_core::{PipelineConfig, RiskSettings, Symbol};
//! use signal_analytics::LinearScorer;
//! use signal_strategy::SignalEngine;
//!
//! let engine = SignalEngine::new(
//!     PipelineConfig::default(),
//!     RiskSettings::default(),
//!     Arc::new(LinearScorer::default()),
//! );
//!
//! let signal = engine.evaluate(&Symbol::crypto("BTC"), &candles, balance)?;
//! ```

pub mod engine;
pub mod entry;
pub mod outcome;

pub use engine::SignalEngine;
pub use entry::EntryFinder;
pub use outcome::{replay_outcome, OutcomeStats, SignalOutcome};
