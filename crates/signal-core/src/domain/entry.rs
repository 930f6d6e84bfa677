//! 진입 후보 타입.
//!
//! 진입 전략 엔진의 출력을 정의합니다:
//! - `Side` - 포지션 방향
//! - `EntryType` - 진입 패턴 유형
//! - `RewardQuality` - 정성적 손익비 평가
//! - `EntryCandidate` - 진입 후보 엔티티

use crate::types::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// 롱 (매수)
    Long,
    /// 숏 (매도)
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// 진입 패턴 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// 저항 돌파 (하락 추세에서는 지지 이탈)
    Breakout,
    /// EMA20 되돌림
    Pullback,
    /// 지지선 반등
    SupportBounce,
    /// 저항선 거부
    ResistanceRejection,
    /// 추세 추종 (모멘텀)
    TrendFollow,
    /// 진입 없음 - 파이프라인 종결
    NoEntry,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryType::Breakout => "breakout",
            EntryType::Pullback => "pullback",
            EntryType::SupportBounce => "support_bounce",
            EntryType::ResistanceRejection => "resistance_rejection",
            EntryType::TrendFollow => "trend_follow",
            EntryType::NoEntry => "no_entry",
        };
        write!(f, "{}", s)
    }
}

/// 정성적 손익비 평가.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardQuality {
    /// 최상의 손익비 (지지/저항 반응)
    Excellent,
    /// 양호한 손익비 (되돌림)
    Good,
    /// 보통의 손익비 (돌파, 추세 추종)
    Moderate,
}

/// 진입 전략 엔진이 생성한 진입 후보.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryCandidate {
    /// 진입 패턴 유형
    pub entry_type: EntryType,
    /// 제안 방향 (NoEntry인 경우 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// 진입 가격 (현재가)
    pub entry_price: Price,
    /// 관련 지지/저항/EMA 레벨 (있는 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Price>,
    /// 레벨까지의 거리 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_pct: Option<f64>,
    /// 정성적 손익비 (NoEntry인 경우 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<RewardQuality>,
    /// 진입 근거 또는 거절 사유
    pub reason: String,
}

impl EntryCandidate {
    /// 진입 후보를 생성합니다.
    pub fn new(
        entry_type: EntryType,
        side: Side,
        entry_price: Price,
        quality: RewardQuality,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entry_type,
            side: Some(side),
            entry_price,
            level: None,
            distance_pct: None,
            quality: Some(quality),
            reason: reason.into(),
        }
    }

    /// 진입 없음 후보를 생성합니다.
    pub fn no_entry(entry_price: Price, reason: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::NoEntry,
            side: None,
            entry_price,
            level: None,
            distance_pct: None,
            quality: None,
            reason: reason.into(),
        }
    }

    /// 관련 레벨과 거리를 설정합니다.
    pub fn with_level(mut self, level: Price, distance_pct: f64) -> Self {
        self.level = Some(level);
        self.distance_pct = Some(distance_pct);
        self
    }

    /// 실제 진입 후보인지 확인합니다.
    pub fn is_entry(&self) -> bool {
        self.entry_type != EntryType::NoEntry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_candidate() {
        let candidate = EntryCandidate::new(
            EntryType::SupportBounce,
            Side::Long,
            dec!(100),
            RewardQuality::Excellent,
            "Bouncing off support in uptrend",
        )
        .with_level(dec!(99.2), 0.8);

        assert!(candidate.is_entry());
        assert_eq!(candidate.side, Some(Side::Long));
        assert_eq!(candidate.level, Some(dec!(99.2)));
    }

    #[test]
    fn test_no_entry_is_terminal() {
        let candidate = EntryCandidate::no_entry(dec!(100), "waiting_for_better_setup");
        assert!(!candidate.is_entry());
        assert!(candidate.side.is_none());
        assert!(candidate.quality.is_none());
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Long.to_string(), "LONG");
        assert_eq!(Side::Short.to_string(), "SHORT");
    }
}
