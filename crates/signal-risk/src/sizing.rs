//! 포지션 크기 계산 및 검증.
//!
//! 제공 기능:
//! - 잔고 티어 기반 리스크 파라미터 산출
//! - 신뢰도 게이팅된 레버리지 계산
//! - 신뢰도/손절 제약을 반영한 포지션 크기 계산
//! - 시그널 리스크 검증

use crate::ladder::{pct_to_decimal, PriceLadder};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signal_core::{Price, RiskSettings, Side, SignalError, SignalResult};
use tracing::{debug, warn};

/// 정밀도를 위해 정수 연산을 사용하여 퍼센트를 금액으로 변환.
/// 예시: pct_to_amount(1000, 10.0) = 100 (1000의 10%)
fn pct_to_amount(amount: Decimal, pct: f64) -> Decimal {
    let scaled_pct = (pct * 10_000.0).round() as i64;
    (amount * Decimal::from(scaled_pct)) / Decimal::from(1_000_000)
}

/// 잔고 구간 경계.
const SMALL_BALANCE: Decimal = dec!(50);
const MID_BALANCE: Decimal = dec!(100);
const LARGE_BALANCE: Decimal = dec!(250);

/// 현재 잔고에서 파생된 리스크 파라미터.
///
/// 잔고의 순수 함수이며 잔고와 독립적으로 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParameters {
    /// 거래당 최대 리스크 비율 (%)
    pub max_risk_pct: f64,
    /// 포지션 크기 비율 (잔고 대비 %)
    pub position_size_pct: f64,
    /// 최대 포지션 크기 (USD)
    pub max_position_usd: Decimal,
    /// 손절 비율 (%)
    pub stop_loss_pct: f64,
    /// 보수적 기본 레버리지 상한 (신뢰도 미반영)
    pub max_leverage: f64,
}

/// 계산 완료된 포지션 사이징.
#[derive(Debug, Clone)]
pub struct SizedPosition {
    /// 포지션 크기 (USD)
    pub position_usd: Decimal,
    /// 포지션 크기 (잔고 대비 %)
    pub position_pct: Decimal,
    /// 예상 리스크 금액 (USD)
    pub risk_amount_usd: Decimal,
    /// 예상 리스크 (잔고 대비 %)
    pub risk_pct: Decimal,
    /// 적용된 손절 비율 (%)
    pub stop_loss_pct: f64,
    /// 권장 레버리지
    pub leverage: f64,
    /// 손절/익절 가격 사다리
    pub ladder: PriceLadder,
}

/// 잔고 적응형 리스크 사이저.
#[derive(Debug, Clone)]
pub struct RiskSizer {
    settings: RiskSettings,
}

impl RiskSizer {
    /// 주어진 설정으로 사이저를 생성합니다.
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    /// 잔고에서 리스크 파라미터를 산출합니다.
    ///
    /// 리스크 비율은 설정 기본값에서 시작해 잔고가 충족하는 가장 높은
    /// 티어 값으로 대체됩니다. 포지션 비율은 리스크 비율에 잔고 구간별
    /// 승수(1.5/2.0/2.5)를 곱하되 상한(10%)을 넘지 않습니다.
    pub fn parameters(&self, balance: Decimal) -> RiskParameters {
        let mut risk_pct = self.settings.max_risk_pct;
        for tier in &self.settings.balance_tiers {
            if balance >= tier.min_balance {
                risk_pct = tier.risk_pct;
            }
        }

        let multiplier = if balance < SMALL_BALANCE {
            1.5
        } else if balance < MID_BALANCE {
            2.0
        } else {
            2.5
        };
        let position_size_pct = (risk_pct * multiplier).min(self.settings.max_position_pct);
        let max_position_usd = pct_to_amount(balance, position_size_pct);

        let stop_loss_pct: f64 = if balance < SMALL_BALANCE {
            1.0
        } else if balance < MID_BALANCE {
            1.5
        } else {
            2.0
        };
        let stop_loss_pct = stop_loss_pct.min(self.settings.max_stop_loss_pct);

        // 신뢰도 미반영 보수적 상한 - 실제 레버리지는 leverage()가 계산
        let max_leverage = if balance < MID_BALANCE { 1.0 } else { 2.0 };

        RiskParameters {
            max_risk_pct: risk_pct,
            position_size_pct,
            max_position_usd,
            stop_loss_pct,
            max_leverage,
        }
    }

    /// 잔고와 신뢰도에서 권장 레버리지를 계산합니다.
    ///
    /// 기본 레버리지는 잔고 구간으로 정하고($50 미만 1배, $100 미만
    /// 2배, $250 미만은 신뢰도 0.80 이상이면 5배 아니면 3배, $250
    /// 이상은 0.85 이상이면 10배 아니면 5배), 신뢰도 승수
    /// (0.8/1.0/1.1)를 곱한 뒤 상한으로 제한합니다.
    pub fn leverage(&self, balance: Decimal, confidence: f32) -> f64 {
        let base: f64 = if balance < SMALL_BALANCE {
            1.0
        } else if balance < MID_BALANCE {
            2.0
        } else if balance < LARGE_BALANCE {
            if confidence >= self.settings.mid_tier_confidence {
                5.0
            } else {
                3.0
            }
        } else if confidence >= self.settings.top_tier_confidence {
            10.0
        } else {
            5.0
        };

        let multiplier = if confidence < 0.75 {
            0.8
        } else if confidence < 0.85 {
            1.0
        } else {
            1.1
        };

        let leverage = (base * multiplier).min(self.settings.max_leverage);

        debug!(
            balance = %balance,
            confidence = confidence,
            leverage = leverage,
            "레버리지 계산"
        );

        (leverage * 10.0).round() / 10.0
    }

    /// 진입 후보를 구체적인 포지션 사이징으로 변환합니다.
    ///
    /// 포지션 USD = 최대 포지션 × clamp(신뢰도, 0.5, 1.5). 손절가가
    /// 명시적으로 주어지고 그 손절 비율이 상한을 넘으면, 리스크 상한을
    /// 보존하도록 포지션을 비례 축소합니다(사다리는 티어 손절 비율로
    /// 계산됩니다). 최종 포지션은 잔고의 10%를 넘지 않습니다.
    ///
    /// # 에러
    ///
    /// 잔고 또는 진입가가 0 이하이면 `SignalError::InvalidInput`으로
    /// 즉시 실패합니다.
    pub fn size(
        &self,
        balance: Decimal,
        confidence: f32,
        entry_price: Price,
        side: Side,
        stop_loss_override: Option<Price>,
    ) -> SignalResult<SizedPosition> {
        if balance <= Decimal::ZERO {
            return Err(SignalError::InvalidInput(format!(
                "잔고가 유효하지 않습니다: {}",
                balance
            )));
        }
        if entry_price <= Decimal::ZERO {
            return Err(SignalError::InvalidInput(format!(
                "진입가가 유효하지 않습니다: {}",
                entry_price
            )));
        }

        let params = self.parameters(balance);

        let confidence_multiplier = pct_to_decimal(f64::from(confidence.clamp(0.5, 1.5)));
        let mut position_usd = params.max_position_usd * confidence_multiplier;

        if let Some(stop_price) = stop_loss_override {
            let implied_pct = ((stop_price - entry_price) / entry_price)
                .abs()
                .to_f64()
                .unwrap_or(0.0)
                * 100.0;

            if implied_pct > self.settings.max_stop_loss_pct {
                warn!(
                    implied_pct = implied_pct,
                    cap = self.settings.max_stop_loss_pct,
                    "손절 비율이 상한 초과 - 포지션 비례 축소"
                );
                let scale = self.settings.max_stop_loss_pct / implied_pct;
                position_usd *= pct_to_decimal(scale);
            }
        }

        let ceiling = pct_to_amount(balance, self.settings.max_position_pct);
        let position_usd = position_usd.min(ceiling);

        let risk_amount_usd = pct_to_amount(position_usd, params.stop_loss_pct);
        let position_pct = position_usd / balance * Decimal::from(100);
        let risk_pct = risk_amount_usd / balance * Decimal::from(100);

        let ladder = PriceLadder::compute(entry_price, side, params.stop_loss_pct);
        let leverage = self.leverage(balance, confidence);

        debug!(
            position_usd = %position_usd,
            position_pct = %position_pct,
            risk_amount = %risk_amount_usd,
            leverage = leverage,
            "포지션 사이징 완료"
        );

        Ok(SizedPosition {
            position_usd,
            position_pct,
            risk_amount_usd,
            risk_pct,
            stop_loss_pct: params.stop_loss_pct,
            leverage,
            ladder,
        })
    }

    /// 시그널이 리스크 기준을 충족하는지 검증합니다.
    ///
    /// 포지션이 잔고 상한 이내이고, 신뢰도가 최소치 이상이며, 잔고가
    /// 양수인지 확인합니다.
    pub fn validate(&self, balance: Decimal, position_usd: Decimal, confidence: f32) -> bool {
        if balance <= Decimal::ZERO {
            warn!("잔고가 0 이하입니다");
            return false;
        }

        let ceiling = pct_to_amount(balance, self.settings.max_position_pct);
        if position_usd > ceiling {
            warn!(
                position = %position_usd,
                ceiling = %ceiling,
                "포지션이 안전 상한 초과"
            );
            return false;
        }

        if confidence < self.settings.min_signal_confidence {
            warn!(
                confidence = confidence,
                minimum = self.settings.min_signal_confidence,
                "신뢰도가 최소 기준 미달"
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sizer() -> RiskSizer {
        RiskSizer::new(RiskSettings::default())
    }

    #[test]
    fn test_tier_selection() {
        let sizer = sizer();

        // 최저 티어 미달 잔고는 설정 기본값(2.0%) 유지
        assert_eq!(sizer.parameters(dec!(10)).max_risk_pct, 2.0);
        assert_eq!(sizer.parameters(dec!(20)).max_risk_pct, 1.5);
        assert_eq!(sizer.parameters(dec!(49)).max_risk_pct, 1.5);
        assert_eq!(sizer.parameters(dec!(50)).max_risk_pct, 2.0);
        assert_eq!(sizer.parameters(dec!(100)).max_risk_pct, 2.5);
        assert_eq!(sizer.parameters(dec!(250)).max_risk_pct, 3.0);
        assert_eq!(sizer.parameters(dec!(1000)).max_risk_pct, 3.0);
    }

    #[test]
    fn test_small_account_scenario() {
        // 잔고 20, 신뢰도 0.80, 진입 100 LONG
        let sizer = sizer();
        let sized = sizer
            .size(dec!(20), 0.80, dec!(100), Side::Long, None)
            .unwrap();

        // 티어 1.5% × 승수 1.5 = 포지션 2.25%
        let params = sizer.parameters(dec!(20));
        assert_eq!(params.position_size_pct, 2.25);
        assert_eq!(params.max_position_usd, dec!(0.45));
        assert_eq!(params.stop_loss_pct, 1.0);

        // 포지션 USD = 0.45 × clamp(0.8) = 0.36
        assert_eq!(sized.position_usd, dec!(0.36));
        assert_eq!(sized.position_pct, dec!(1.8));
        assert_eq!(sized.stop_loss_pct, 1.0);
        assert_eq!(sized.ladder.stop_loss, dec!(99.0));
        assert_eq!(sized.ladder.take_profit_1, dec!(101.5));
        assert_eq!(sized.ladder.take_profit_2, dec!(103.0));
        assert_eq!(sized.ladder.take_profit_3, dec!(104.5));
        assert_eq!(sized.leverage, 1.0);
    }

    #[test]
    fn test_large_account_leverage_scenario() {
        // 잔고 300, 신뢰도 0.90: 기본 10배 × 1.1 = 11 → 상한 10배
        let sizer = sizer();
        assert_eq!(sizer.leverage(dec!(300), 0.90), 10.0);
    }

    #[test]
    fn test_leverage_bands() {
        let sizer = sizer();

        assert_eq!(sizer.leverage(dec!(30), 0.80), 1.0);
        assert_eq!(sizer.leverage(dec!(80), 0.80), 2.0);
        // $100-250: 0.80 이상이면 5배, 미만이면 3배
        assert_eq!(sizer.leverage(dec!(150), 0.82), 5.0);
        assert_eq!(sizer.leverage(dec!(150), 0.78), 3.0);
        // 낮은 신뢰도는 0.8 승수로 감쇄
        assert_eq!(sizer.leverage(dec!(150), 0.70), 2.4);
        // $250 이상: 0.85 미만이면 5배
        assert_eq!(sizer.leverage(dec!(400), 0.80), 5.0);
    }

    #[test]
    fn test_stop_override_scales_position_down() {
        let sizer = sizer();

        // 진입 100, 손절 90 → 손절 10%는 상한 5% 초과 → 절반으로 축소
        let with_override = sizer
            .size(dec!(1000), 1.0, dec!(100), Side::Long, Some(dec!(90)))
            .unwrap();
        let without = sizer
            .size(dec!(1000), 1.0, dec!(100), Side::Long, None)
            .unwrap();

        assert_eq!(with_override.position_usd, without.position_usd * dec!(0.5));
    }

    #[test]
    fn test_position_never_exceeds_ceiling() {
        let sizer = sizer();
        // 신뢰도 1.5배 클램프에서도 잔고 10% 상한 준수
        let sized = sizer
            .size(dec!(1000), 1.0, dec!(50), Side::Long, None)
            .unwrap();

        assert!(sized.position_usd <= dec!(100));
    }

    #[test]
    fn test_invalid_balance_fails_closed() {
        let sizer = sizer();
        assert!(matches!(
            sizer.size(dec!(0), 0.8, dec!(100), Side::Long, None),
            Err(SignalError::InvalidInput(_))
        ));
        assert!(matches!(
            sizer.size(dec!(-5), 0.8, dec!(100), Side::Long, None),
            Err(SignalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_entry_price_fails_closed() {
        let sizer = sizer();
        assert!(sizer.size(dec!(100), 0.8, dec!(0), Side::Long, None).is_err());
    }

    #[test]
    fn test_validate() {
        let sizer = sizer();

        assert!(sizer.validate(dec!(100), dec!(5), 0.8));
        // 포지션이 잔고 10% 초과
        assert!(!sizer.validate(dec!(100), dec!(15), 0.8));
        // 신뢰도 미달
        assert!(!sizer.validate(dec!(100), dec!(5), 0.5));
        // 잔고 0 이하
        assert!(!sizer.validate(dec!(0), dec!(0), 0.8));
    }

    #[test]
    fn test_short_side_ladder() {
        let sizer = sizer();
        let sized = sizer
            .size(dec!(200), 0.85, dec!(50), Side::Short, None)
            .unwrap();

        assert!(sized.ladder.stop_loss > dec!(50));
        assert!(sized.ladder.take_profit_1 < dec!(50));
        assert!(sized.ladder.take_profit_3 < sized.ladder.take_profit_2);
    }

    proptest! {
        #[test]
        fn prop_safety_ceilings(
            balance_cents in 1i64..100_000_000,
            confidence in 0.0f32..=1.0,
        ) {
            let sizer = sizer();
            let balance = Decimal::from(balance_cents) / Decimal::from(100);

            let params = sizer.parameters(balance);
            prop_assert!(params.position_size_pct <= 10.0);
            prop_assert!(params.stop_loss_pct <= 5.0);

            let sized = sizer
                .size(balance, confidence, dec!(100), Side::Long, None)
                .unwrap();
            let ceiling = balance * Decimal::from(10) / Decimal::from(100);
            prop_assert!(sized.position_usd <= ceiling);
            prop_assert!(sized.leverage <= 10.0);
            prop_assert!(sized.ladder.stop_loss < dec!(100));
        }
    }
}
