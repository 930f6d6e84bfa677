//! 시장 상태 분류.
//!
//! 추세 여부에 따라 진입 탐색을 게이팅하는 6단계 분류입니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 시장 상태를 나타내는 6단계 분류.
///
/// # 상태 설명
///
/// - **StrongUptrend**: 강한 상승 추세 (ADX > 30 + 추세 강도 > 70)
/// - **WeakUptrend**: 약한 상승 추세 (정배열이나 모멘텀 부족)
/// - **StrongDowntrend**: 강한 하락 추세
/// - **WeakDowntrend**: 약한 하락 추세
/// - **RangeBound**: 박스권 / 횡보
/// - **VolatileRange**: 변동성이 큰 박스권 (변동성 > 3%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCondition {
    /// 강한 상승 추세
    StrongUptrend,
    /// 약한 상승 추세
    WeakUptrend,
    /// 강한 하락 추세
    StrongDowntrend,
    /// 약한 하락 추세
    WeakDowntrend,
    /// 박스권 / 횡보
    #[default]
    RangeBound,
    /// 변동성이 큰 박스권
    VolatileRange,
}

impl MarketCondition {
    /// 진입 탐색이 허용되는 상태인지 확인합니다.
    ///
    /// 4개의 추세 상태에서만 true입니다. 박스권에서는 진입을 탐색하지
    /// 않습니다.
    pub fn is_tradeable(self) -> bool {
        matches!(
            self,
            Self::StrongUptrend
                | Self::WeakUptrend
                | Self::StrongDowntrend
                | Self::WeakDowntrend
        )
    }

    /// 상승 추세 여부.
    pub fn is_uptrend(self) -> bool {
        matches!(self, Self::StrongUptrend | Self::WeakUptrend)
    }

    /// 하락 추세 여부.
    pub fn is_downtrend(self) -> bool {
        matches!(self, Self::StrongDowntrend | Self::WeakDowntrend)
    }

    /// 박스권 여부.
    pub fn is_ranging(self) -> bool {
        matches!(self, Self::RangeBound | Self::VolatileRange)
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongUptrend => "STRONG_UPTREND",
            Self::WeakUptrend => "WEAK_UPTREND",
            Self::StrongDowntrend => "STRONG_DOWNTREND",
            Self::WeakDowntrend => "WEAK_DOWNTREND",
            Self::RangeBound => "RANGE_BOUND",
            Self::VolatileRange => "VOLATILE_RANGE",
        };
        write!(f, "{}", s)
    }
}
