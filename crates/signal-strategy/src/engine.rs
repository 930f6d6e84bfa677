//! 시그널 파이프라인 엔진.
//!
//! 캔들 시퀀스를 게이팅된 트레이딩 시그널로 변환하는 필터 체인입니다:
//!
//! ```text
//! 캔들 → 지표 스냅샷 → 상태 분류 → 진입 탐색 → 신뢰도 게이트 → 사이징
//! ```
//!
//! 어느 단계에서든 거절되면 "시그널 없음"(`Ok(None)`)으로 단락됩니다.
//! 점수 매기기 순위가 아니라 필터 체인입니다.
//!
//! 파이프라인은 호출 단위로 동기적이며, 설정 상수 외의 숨은 가변
//! 상태가 없습니다. 서로 다른 심볼에 대한 호출은 공유 상태가 없어
//! 호출자가 안전하게 병렬화할 수 있습니다. 잔고는 호출 시점의 스냅샷
//! 값으로 읽어야 합니다.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use signal_analytics::{
    ConfidenceGate, ConfidenceScorer, IndicatorEngine, RegimeClassifier,
};
use signal_core::{
    validate_series, Candle, PipelineConfig, RiskSettings, SignalError, SignalResult, Symbol,
    TradeSignal,
};
use signal_risk::RiskSizer;

use crate::entry::EntryFinder;

/// 시그널 파이프라인 엔진.
///
/// 모든 컴포넌트는 생성 시점의 불변 설정으로 구성되며, 평가 호출 간
/// 아무 상태도 공유하지 않습니다.
pub struct SignalEngine {
    indicators: IndicatorEngine,
    classifier: RegimeClassifier,
    finder: EntryFinder,
    gate: ConfidenceGate,
    sizer: RiskSizer,
}

impl SignalEngine {
    /// 설정과 주입된 스코어러로 엔진을 생성합니다.
    pub fn new(
        pipeline: PipelineConfig,
        risk: RiskSettings,
        scorer: Arc<dyn ConfidenceScorer>,
    ) -> Self {
        Self {
            indicators: IndicatorEngine::new(),
            classifier: RegimeClassifier::new(pipeline.clone()),
            finder: EntryFinder::new(pipeline.clone()),
            gate: ConfidenceGate::new(scorer, &pipeline),
            sizer: RiskSizer::new(risk),
        }
    }

    /// 캔들 시퀀스를 평가해 시그널을 생성하거나 거절합니다.
    ///
    /// # 반환
    ///
    /// - `Ok(Some(signal))` - 모든 단계를 통과한 시그널
    /// - `Ok(None)` - 어느 단계에서든 거절 (박스권, 진입 없음, 낮은
    ///   신뢰도, 리스크 검증 실패)
    /// - `Err` - 잘못된 입력(잔고/캔들 순서) 또는 스코어러 평가 불능
    pub fn evaluate(
        &self,
        symbol: &Symbol,
        candles: &[Candle],
        balance: Decimal,
    ) -> SignalResult<Option<TradeSignal>> {
        if balance <= Decimal::ZERO {
            return Err(SignalError::InvalidInput(format!(
                "잔고가 유효하지 않습니다: {}",
                balance
            )));
        }
        validate_series(candles)?;

        // 1단계: 지표 스냅샷 (연성 실패 - 중립 기본값)
        let snapshot = self.indicators.snapshot(candles);

        // 2단계: 시장 상태 분류
        let (condition, report) = self.classifier.classify(&snapshot, candles);
        if !condition.is_tradeable() {
            info!(
                symbol = %symbol,
                condition = %condition,
                reason = %report.reason,
                "박스권 - 시그널 없음"
            );
            return Ok(None);
        }

        // 3단계: 진입 탐색
        let candidate = self.finder.find_entry(condition, &snapshot, candles);
        if !candidate.is_entry() {
            debug!(
                symbol = %symbol,
                reason = %candidate.reason,
                "진입 후보 없음"
            );
            return Ok(None);
        }
        let side = match candidate.side {
            Some(side) => side,
            None => return Ok(None),
        };

        // 4단계: 신뢰도 게이트 (스코어러 실패는 치명적)
        let decision = self
            .gate
            .confirm(&snapshot)
            .map_err(|e| SignalError::Scorer(e.to_string()))?;
        if !decision.confirmed {
            info!(
                symbol = %symbol,
                confidence = decision.confidence,
                "신뢰도 미달 - 시그널 거절"
            );
            return Ok(None);
        }

        // 5단계: 리스크 사이징
        let sized = self.sizer.size(
            balance,
            decision.confidence,
            candidate.entry_price,
            side,
            None,
        )?;

        if !self
            .sizer
            .validate(balance, sized.position_usd, decision.confidence)
        {
            info!(symbol = %symbol, "리스크 검증 실패 - 시그널 거절");
            return Ok(None);
        }

        let signal = TradeSignal {
            id: Uuid::new_v4(),
            symbol: symbol.clone(),
            side,
            entry_type: candidate.entry_type,
            condition,
            entry_price: candidate.entry_price,
            stop_loss: sized.ladder.stop_loss,
            take_profit_1: sized.ladder.take_profit_1,
            take_profit_2: sized.ladder.take_profit_2,
            take_profit_3: sized.ladder.take_profit_3,
            leverage: sized.leverage,
            confidence: decision.confidence,
            position_size_usd: sized.position_usd,
            position_size_pct: sized.position_pct,
            risk_amount_usd: sized.risk_amount_usd,
            risk_pct: sized.risk_pct,
            stop_loss_pct: sized.stop_loss_pct,
            reason: candidate.reason,
            created_at: Utc::now(),
        };

        info!(
            symbol = %symbol,
            side = %signal.side,
            entry_type = %signal.entry_type,
            entry = %signal.entry_price,
            confidence = signal.confidence,
            position = %signal.position_size_usd,
            "시그널 생성"
        );

        Ok(Some(signal))
    }
}
