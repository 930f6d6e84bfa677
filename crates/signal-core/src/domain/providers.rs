//! 외부 협력자 경계 트레이트.
//!
//! 파이프라인 코어는 I/O를 수행하지 않습니다. 캔들 수집과 시그널 전달은
//! 이 트레이트들의 구현체(거래소 어댑터, 알림 채널, 저장 계층)가
//! 담당합니다.

use crate::domain::{Candle, TradeSignal};
use crate::error::SignalResult;
use crate::types::{Symbol, Timeframe};
use async_trait::async_trait;

/// 캔들 데이터 공급자.
///
/// 구현체는 타임스탬프 오름차순 시퀀스를 반환해야 합니다. 캔들 갭은
/// 지표 정확도를 떨어뜨리지만 에러는 아닙니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 심볼/타임프레임에 대한 최근 캔들을 조회합니다.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> SignalResult<Vec<Candle>>;
}

/// 완성된 시그널의 소비자.
///
/// 포매팅/표시/저장은 전부 구현체의 몫이며, 코어는 구조화된 값만
/// 생산합니다.
#[async_trait]
pub trait SignalSink: Send + Sync {
    /// 시그널을 전달합니다.
    async fn deliver(&self, signal: &TradeSignal) -> SignalResult<()>;
}
