//! 설정 관리.
//!
//! 파이프라인이 소비하는 모든 임계값과 리스크 티어를 정의합니다.
//! 컴포넌트는 생성 시점에 불변 설정 구조체를 받으며, 프로세스 전역
//! 가변 상태는 없습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// 리스크 설정
    #[serde(default)]
    pub risk: RiskSettings,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 파이프라인(지표/상태 분류/진입 탐색/신뢰도 게이트) 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// ADX 임계값 - 이 값 미만이면 박스권으로 분류
    pub adx_threshold: f64,
    /// 박스권 가격 범위 임계값 (%)
    pub range_threshold_pct: f64,
    /// 상태 분류 참조 기간 (캔들 수)
    pub lookback: usize,
    /// 방향 전환 비율 임계값 - 초과 시 choppy로 분류
    pub chop_threshold: f64,
    /// VolatileRange로 승격되는 변동성 임계값 (%)
    pub volatile_range_pct: f64,
    /// 돌파 확인에 필요한 캔들 수
    pub breakout_confirmation: usize,
    /// 지지/저항 레벨 근접 허용 오차 (%)
    pub sr_tolerance_pct: f64,
    /// 피벗 탐지 대칭 윈도우 (캔들 수)
    pub pivot_window: usize,
    /// 레벨 클러스터링 허용 오차 (%)
    pub cluster_tolerance_pct: f64,
    /// 스코어러 신뢰도 임계값
    pub confidence_threshold: f32,
    /// 파이프라인 최소 신뢰도 게이트
    pub min_confidence: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adx_threshold: 25.0,
            range_threshold_pct: 2.0,
            lookback: 50,
            chop_threshold: 0.4,
            volatile_range_pct: 3.0,
            breakout_confirmation: 2,
            sr_tolerance_pct: 1.0,
            pivot_window: 5,
            cluster_tolerance_pct: 1.0,
            confidence_threshold: 0.75,
            min_confidence: 0.70,
        }
    }
}

/// 잔고 구간별 리스크 티어.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BalanceTier {
    /// 티어 적용 최소 잔고 (USD)
    pub min_balance: Decimal,
    /// 거래당 리스크 비율 (%)
    pub risk_pct: f64,
}

/// 리스크 관리 설정.
///
/// 잔고가 커질수록 점진적으로 공격적인 파라미터를 허용하되,
/// 안전 상한(포지션 10%, 손절 5%, 레버리지 10배)을 넘지 않습니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskSettings {
    /// 기본 거래당 최대 리스크 비율 (%) - 티어 미달 잔고에 적용
    pub max_risk_pct: f64,
    /// 잔고 구간별 리스크 티어 (min_balance 오름차순)
    pub balance_tiers: Vec<BalanceTier>,
    /// 단일 포지션 최대 비율 상한 (잔고 대비 %)
    pub max_position_pct: f64,
    /// 손절 비율 상한 (%)
    pub max_stop_loss_pct: f64,
    /// 레버리지 상한
    pub max_leverage: f64,
    /// 중간 티어($100~250)에서 5배 레버리지를 허용하는 신뢰도
    pub mid_tier_confidence: f32,
    /// 상위 티어($250+)에서 10배 레버리지를 허용하는 신뢰도
    pub top_tier_confidence: f32,
    /// 시그널 검증에 요구되는 최소 신뢰도
    pub min_signal_confidence: f32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            max_risk_pct: 2.0,
            balance_tiers: vec![
                BalanceTier {
                    min_balance: Decimal::from(20),
                    risk_pct: 1.5,
                },
                BalanceTier {
                    min_balance: Decimal::from(50),
                    risk_pct: 2.0,
                },
                BalanceTier {
                    min_balance: Decimal::from(100),
                    risk_pct: 2.5,
                },
                BalanceTier {
                    min_balance: Decimal::from(250),
                    risk_pct: 3.0,
                },
            ],
            max_position_pct: 10.0,
            max_stop_loss_pct: 5.0,
            max_leverage: 10.0,
            mid_tier_confidence: 0.80,
            top_tier_confidence: 0.85,
            min_signal_confidence: 0.6,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SIGNAL__` 접두사와 `__` 구분자로 오버라이드합니다
    /// (예: `SIGNAL__PIPELINE__ADX_THRESHOLD=20`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
