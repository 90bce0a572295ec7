//! Monte Carlo risk curves for a risk profile.
//!
//! Draws a sequence of wins and losses at a fixed win rate and applies the
//! profile's sizing rule, so profiles can be compared before any price data
//! is involved.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::profile::{RiskProfile, RiskStrategy};
use crate::backtest::metrics::{drawdown_metrics, profit_factor, sharpe_ratio};

/// Invalid risk simulation parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RiskCurveError {
    /// Win rate outside [0, 1].
    #[error("win rate must be in [0, 1], got {value}")]
    InvalidWinRate {
        /// Offending win rate.
        value: Decimal,
    },

    /// Starting balance is zero or negative.
    #[error("initial balance must be positive, got {value}")]
    NonPositiveBalance {
        /// Offending balance.
        value: Decimal,
    },

    /// Risk:reward ratio is zero or negative.
    #[error("risk reward ratio must be positive, got {value}")]
    NonPositiveRiskReward {
        /// Offending ratio.
        value: Decimal,
    },

    /// Risk cap outside (0, 100].
    #[error("max risk per trade must be in (0, 100], got {value}")]
    MaxRiskOutOfRange {
        /// Offending percentage.
        value: Decimal,
    },
}

/// Parameters for a simulated risk curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSimulationParams {
    /// Starting balance.
    pub initial_balance: Decimal,
    /// Number of simulated trades.
    pub num_trades: usize,
    /// Probability of a win, as a fraction.
    pub win_rate: Decimal,
    /// Reward per unit of risk on a win.
    pub risk_reward_ratio: Decimal,
    /// Cap on the risk percent of any trade.
    pub max_risk_per_trade: Decimal,
    /// Sizing rule.
    pub profile: RiskProfile,
    /// Seed for reproducibility (None = OS entropy).
    pub seed: Option<u64>,
}

impl Default for RiskSimulationParams {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(10_000, 0),
            num_trades: 100,
            win_rate: Decimal::new(55, 2), // 0.55
            risk_reward_ratio: Decimal::TWO,
            max_risk_per_trade: Decimal::TWO,
            profile: RiskProfile::moderate(),
            seed: None,
        }
    }
}

/// A simulated risk curve and its statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSimulationResult {
    /// Balance after each trade, starting with the initial balance.
    pub balance_curve: Vec<Decimal>,
    /// Balance after the last trade.
    pub final_balance: Decimal,
    /// Largest peak-to-balance decline.
    pub max_drawdown: Decimal,
    /// That decline as a percent of its peak.
    pub max_drawdown_percent: Decimal,
    /// Longest run of consecutive losses.
    pub max_consecutive_losses: usize,
    /// Annualized Sharpe ratio of the curve.
    pub sharpe_ratio: Decimal,
    /// Gross profit over gross loss (0 when there are no losses).
    pub profit_factor: Decimal,
}

/// Generates risk curves from [`RiskSimulationParams`].
#[derive(Debug, Clone)]
pub struct RiskCurveGenerator {
    params: RiskSimulationParams,
}

impl RiskCurveGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new(params: RiskSimulationParams) -> Self {
        Self { params }
    }

    /// Simulate one curve.
    ///
    /// Stops early if the balance is wiped out.
    pub fn generate(&self) -> Result<RiskSimulationResult, RiskCurveError> {
        let params = &self.params;
        self.validate()?;

        let probability = params
            .win_rate
            .to_f64()
            .ok_or(RiskCurveError::InvalidWinRate {
                value: params.win_rate,
            })?;
        let mut rng = params
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let mut balance = params.initial_balance;
        let mut curve = Vec::with_capacity(params.num_trades + 1);
        curve.push(balance);

        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;
        let mut losses = 0usize;
        let mut max_consecutive_losses = 0usize;

        // Kelly sizes from the assumed edge rather than an observed one.
        let risk_pct = params
            .profile
            .risk_percent(params.win_rate, params.risk_reward_ratio)
            .min(params.max_risk_per_trade);

        for _ in 0..params.num_trades {
            if balance <= Decimal::ZERO {
                break;
            }

            let base = match params.profile.strategy {
                RiskStrategy::Fixed => params.initial_balance,
                RiskStrategy::Compounding | RiskStrategy::KellyCriterion => balance,
            };
            let risk = base * risk_pct / Decimal::ONE_HUNDRED;

            if rng.random_bool(probability) {
                let reward = risk * params.risk_reward_ratio;
                balance += reward;
                gross_profit += reward;
                losses = 0;
            } else {
                balance -= risk;
                gross_loss += risk;
                losses += 1;
                max_consecutive_losses = max_consecutive_losses.max(losses);
            }

            curve.push(balance);
        }

        let drawdown = drawdown_metrics(&curve);

        debug!(
            profile = %params.profile.name,
            trades = curve.len() - 1,
            final_balance = %balance,
            "Risk curve generated"
        );

        Ok(RiskSimulationResult {
            final_balance: balance,
            max_drawdown: drawdown.max_drawdown,
            max_drawdown_percent: drawdown.max_drawdown_percent,
            max_consecutive_losses,
            sharpe_ratio: sharpe_ratio(&curve),
            profit_factor: profit_factor(gross_profit, gross_loss),
            balance_curve: curve,
        })
    }

    fn validate(&self) -> Result<(), RiskCurveError> {
        let params = &self.params;

        if params.win_rate < Decimal::ZERO || params.win_rate > Decimal::ONE {
            return Err(RiskCurveError::InvalidWinRate {
                value: params.win_rate,
            });
        }
        if params.initial_balance <= Decimal::ZERO {
            return Err(RiskCurveError::NonPositiveBalance {
                value: params.initial_balance,
            });
        }
        if params.risk_reward_ratio <= Decimal::ZERO {
            return Err(RiskCurveError::NonPositiveRiskReward {
                value: params.risk_reward_ratio,
            });
        }
        if params.max_risk_per_trade <= Decimal::ZERO
            || params.max_risk_per_trade > Decimal::ONE_HUNDRED
        {
            return Err(RiskCurveError::MaxRiskOutOfRange {
                value: params.max_risk_per_trade,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seeded(win_rate: Decimal, profile: RiskProfile) -> RiskSimulationParams {
        RiskSimulationParams {
            num_trades: 50,
            win_rate,
            profile,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_curve() {
        let params = seeded(dec!(0.5), RiskProfile::moderate());
        let Ok(first) = RiskCurveGenerator::new(params.clone()).generate() else {
            panic!("valid params should generate");
        };
        let Ok(second) = RiskCurveGenerator::new(params).generate() else {
            panic!("valid params should generate");
        };

        assert_eq!(first, second);
        assert_eq!(first.balance_curve.len(), 51);
        assert_eq!(first.balance_curve[0], dec!(10000));
    }

    #[test]
    fn test_certain_wins_compound() {
        let params = RiskSimulationParams {
            num_trades: 3,
            ..seeded(Decimal::ONE, RiskProfile::moderate())
        };
        let Ok(result) = RiskCurveGenerator::new(params).generate() else {
            panic!("valid params should generate");
        };

        // +2% per trade on the running balance
        assert_eq!(
            result.balance_curve,
            vec![dec!(10000), dec!(10200), dec!(10404), dec!(10612.08)]
        );
        assert_eq!(result.max_drawdown, Decimal::ZERO);
        assert_eq!(result.profit_factor, Decimal::ZERO);
        assert_eq!(result.max_consecutive_losses, 0);
    }

    #[test]
    fn test_certain_losses_fixed() {
        let params = RiskSimulationParams {
            num_trades: 4,
            ..seeded(Decimal::ZERO, RiskProfile::conservative())
        };
        let Ok(result) = RiskCurveGenerator::new(params).generate() else {
            panic!("valid params should generate");
        };

        // 0.5% of the initial balance each time
        assert_eq!(result.final_balance, dec!(9800));
        assert_eq!(result.max_consecutive_losses, 4);
        assert_eq!(result.max_drawdown, dec!(200));
        assert_eq!(result.max_drawdown_percent, dec!(2));
    }

    #[test]
    fn test_risk_capped() {
        let profile = RiskProfile::new("Reckless", dec!(10), RiskStrategy::Fixed);
        let params = RiskSimulationParams {
            num_trades: 1,
            max_risk_per_trade: dec!(1),
            ..seeded(Decimal::ZERO, profile)
        };
        let Ok(result) = RiskCurveGenerator::new(params).generate() else {
            panic!("valid params should generate");
        };

        assert_eq!(result.final_balance, dec!(9900));
    }

    #[test]
    fn test_invalid_params() {
        let params = seeded(dec!(1.5), RiskProfile::moderate());
        assert_eq!(
            RiskCurveGenerator::new(params).generate(),
            Err(RiskCurveError::InvalidWinRate { value: dec!(1.5) })
        );

        let params = RiskSimulationParams {
            initial_balance: Decimal::ZERO,
            ..seeded(dec!(0.5), RiskProfile::moderate())
        };
        assert!(matches!(
            RiskCurveGenerator::new(params).generate(),
            Err(RiskCurveError::NonPositiveBalance { .. })
        ));
    }
}
