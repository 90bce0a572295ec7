//! Risk profiles deciding how much of the balance each trade puts at risk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the per-trade risk percentage evolves over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStrategy {
    /// Constant percentage of the starting balance.
    Fixed,
    /// Constant percentage of the current balance.
    #[default]
    Compounding,
    /// Half-Kelly fraction from the observed win rate, capped at the default.
    KellyCriterion,
}

/// Named risk profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Display name.
    pub name: String,
    /// Default (and maximum) risk percent per trade.
    pub default_risk: Decimal,
    /// Risk strategy.
    pub strategy: RiskStrategy,
}

impl RiskProfile {
    /// Create a custom profile.
    #[must_use]
    pub fn new(name: impl Into<String>, default_risk: Decimal, strategy: RiskStrategy) -> Self {
        Self {
            name: name.into(),
            default_risk,
            strategy,
        }
    }

    /// 0.5% fixed risk.
    #[must_use]
    pub fn conservative() -> Self {
        Self::new("Conservative", Decimal::new(5, 1), RiskStrategy::Fixed)
    }

    /// 1% compounding risk.
    #[must_use]
    pub fn moderate() -> Self {
        Self::new("Moderate", Decimal::ONE, RiskStrategy::Compounding)
    }

    /// Kelly sizing capped at 2%.
    #[must_use]
    pub fn aggressive() -> Self {
        Self::new(
            "Aggressive (Kelly)",
            Decimal::TWO,
            RiskStrategy::KellyCriterion,
        )
    }

    /// Risk percent for the next trade under this profile.
    #[must_use]
    pub fn risk_percent(&self, win_rate: Decimal, risk_reward: Decimal) -> Decimal {
        risk_percent(self.strategy, self.default_risk, win_rate, risk_reward)
    }
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self::moderate()
    }
}

/// Risk percent for the next trade.
///
/// `win_rate` is a fraction in [0, 1]. Kelly returns the half-Kelly
/// percentage clamped to `[0, default_risk]`, and falls back to
/// `default_risk` when the win rate or ratio give no usable edge estimate.
#[must_use]
pub fn risk_percent(
    strategy: RiskStrategy,
    default_risk: Decimal,
    win_rate: Decimal,
    risk_reward: Decimal,
) -> Decimal {
    match strategy {
        RiskStrategy::Fixed | RiskStrategy::Compounding => default_risk,
        RiskStrategy::KellyCriterion => {
            if win_rate <= Decimal::ZERO || win_rate >= Decimal::ONE || risk_reward <= Decimal::ZERO
            {
                return default_risk;
            }

            let kelly = (win_rate * risk_reward - (Decimal::ONE - win_rate)) / risk_reward;
            let half_kelly_pct = kelly / Decimal::TWO * Decimal::ONE_HUNDRED;

            half_kelly_pct.clamp(Decimal::ZERO, default_risk.max(Decimal::ZERO))
        }
    }
}
