//! 파이프라인의 최종 트레이딩 시그널.

use crate::domain::{EntryType, MarketCondition, Side};
use crate::types::{Price, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 파이프라인이 모든 단계를 통과한 뒤 생성하는 최종 시그널.
///
/// 생성 이후 불변이며, 소유권은 호출자(알림/저장 계층)로 넘어갑니다.
///
/// # 가격 불변식
///
/// LONG: `stop_loss < entry_price < take_profit_1 < take_profit_2 <
/// take_profit_3`. SHORT는 역순. 익절 간격은 손절 거리의 정확히
/// 1.5배/3.0배/4.5배입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    /// 고유 시그널 ID
    pub id: Uuid,
    /// 거래 심볼
    pub symbol: Symbol,
    /// 포지션 방향
    pub side: Side,
    /// 진입 패턴 유형
    pub entry_type: EntryType,
    /// 시그널 생성 시점의 시장 상태
    pub condition: MarketCondition,
    /// 진입 가격
    pub entry_price: Price,
    /// 손절가
    pub stop_loss: Price,
    /// 1차 익절가 (손절 거리의 1.5배)
    pub take_profit_1: Price,
    /// 2차 익절가 (손절 거리의 3.0배)
    pub take_profit_2: Price,
    /// 3차 익절가 (손절 거리의 4.5배)
    pub take_profit_3: Price,
    /// 권장 레버리지
    pub leverage: f64,
    /// 신뢰도 점수 (0.0 ~ 1.0)
    pub confidence: f32,
    /// 포지션 크기 (USD)
    pub position_size_usd: Decimal,
    /// 포지션 크기 (잔고 대비 %)
    pub position_size_pct: Decimal,
    /// 예상 리스크 금액 (USD)
    pub risk_amount_usd: Decimal,
    /// 예상 리스크 (잔고 대비 %)
    pub risk_pct: Decimal,
    /// 손절 비율 (%)
    pub stop_loss_pct: f64,
    /// 진입 근거
    pub reason: String,
    /// 시그널 생성 타임스탬프
    pub created_at: DateTime<Utc>,
}

impl TradeSignal {
    /// 가격 사다리 불변식을 확인합니다.
    pub fn has_valid_ladder(&self) -> bool {
        match self.side {
            Side::Long => {
                self.stop_loss < self.entry_price
                    && self.entry_price < self.take_profit_1
                    && self.take_profit_1 < self.take_profit_2
                    && self.take_profit_2 < self.take_profit_3
            }
            Side::Short => {
                self.stop_loss > self.entry_price
                    && self.entry_price > self.take_profit_1
                    && self.take_profit_1 > self.take_profit_2
                    && self.take_profit_2 > self.take_profit_3
            }
        }
    }

    /// 진입가 대비 손절 거리(절대값)를 반환합니다.
    pub fn stop_distance(&self) -> Decimal {
        (self.entry_price - self.stop_loss).abs()
    }
}
