//! 시그널 파이프라인의 에러 타입.
//!
//! 수치 계산의 연성 실패(데이터 부족, 0 분모)는 각 모듈에서 정의된
//! 중립값으로 복구되며 여기에 나타나지 않습니다. 이 타입은 호출자에게
//! 명시적으로 드러나야 하는 실패만 다룹니다.

use thiserror::Error;

/// 핵심 시그널 에러.
#[derive(Debug, Error)]
pub enum SignalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 잘못된 입력 (잔고 <= 0, 캔들 순서 위반 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 신뢰도 스코어러 평가 불가 - 해당 호출은 실패로 처리됩니다
    #[error("스코어러 에러: {0}")]
    Scorer(String),

    /// 리스크 계산 에러
    #[error("리스크 에러: {0}")]
    Risk(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 시그널 작업을 위한 Result 타입.
pub type SignalResult<T> = Result<T, SignalError>;

impl SignalError {
    /// 치명적인 에러인지 확인합니다.
    ///
    /// 치명적 에러는 파이프라인이 신뢰도 값을 임의로 만들어내지 않도록
    /// 해당 호출 전체를 중단시켜야 합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SignalError::Scorer(_) | SignalError::Config(_))
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::Serialization(err.to_string())
    }
}
