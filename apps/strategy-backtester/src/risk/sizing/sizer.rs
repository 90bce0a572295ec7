//! Core trade sizing logic.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::{CalculationError, SizingError, ValidationError};
use super::pip_table::pip_value;
use super::types::{
    Breakeven, PositionDirection, StopSpec, TargetLeg, TargetSpec, TargetSplit, TradeParameters,
    TradeResult,
};

/// Configuration for trade sizing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSizerConfig {
    /// Decimal places kept in the position size.
    pub lot_precision: u32,
}

impl Default for TradeSizerConfig {
    fn default() -> Self {
        Self { lot_precision: 2 }
    }
}

/// Converts risk and stop/target specifications into a sized trade.
///
/// Sizing is pure: the same parameters always produce the same result and
/// nothing is cached between calls beyond the shared pip table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeSizer {
    config: TradeSizerConfig,
}

impl TradeSizer {
    /// Create a trade sizer with custom configuration.
    #[must_use]
    pub const fn with_config(config: TradeSizerConfig) -> Self {
        Self { config }
    }

    /// Size a trade.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed parameters, or a calculation
    /// error when the stop distance or pip value is zero.
    pub fn size(&self, params: &TradeParameters) -> Result<TradeResult, SizingError> {
        Self::validate_input(params)?;

        let instrument = params.instrument;
        let entry = params.entry_price;
        let direction = params.direction;
        let pips_per_unit = instrument.pips_per_unit();
        let pip_size = instrument.pip_size();

        let pip_value = pip_value(instrument, params.lot_size, params.contract_size);
        if pip_value.is_zero() {
            return Err(CalculationError::ZeroPipValue {
                instrument,
                units: params.contract_size,
            }
            .into());
        }

        let stop_pips = match params.stop {
            StopSpec::Pips(pips) => pips,
            StopSpec::Price(price) => (entry - price).abs() * pips_per_unit,
        };
        if stop_pips.is_zero() {
            return Err(CalculationError::ZeroStopDistance.into());
        }

        let (target_pips, risk_reward_ratio) = match params.target {
            TargetSpec::Pips(pips) => (pips, checked_div(pips, stop_pips, "risk reward ratio")?),
            TargetSpec::Price(price) => {
                let pips = (price - entry).abs() * pips_per_unit;
                (pips, checked_div(pips, stop_pips, "risk reward ratio")?)
            }
            TargetSpec::RiskReward(ratio) => (checked_mul(stop_pips, ratio, "target pips")?, ratio),
        };

        let risk_amount = checked_mul(params.account_balance, params.risk_percent, "risk amount")?
            / Decimal::ONE_HUNDRED;
        let exact_position_size = checked_div(
            risk_amount,
            checked_mul(pip_value, stop_pips, "stop value")?,
            "position size",
        )?;
        let position_size = self.round_lots(exact_position_size);
        let reward_amount = checked_mul(risk_amount, risk_reward_ratio, "reward amount")?;

        let stop_loss_price = match params.stop {
            StopSpec::Price(price) => price,
            StopSpec::Pips(pips) => direction.toward_loss(entry, pips * pip_size),
        };
        let take_profit_price = match params.target {
            TargetSpec::Price(price) => price,
            TargetSpec::Pips(_) | TargetSpec::RiskReward(_) => {
                direction.toward_profit(entry, target_pips * pip_size)
            }
        };

        let breakeven = Self::breakeven(params, pip_value)?;

        let (tp1, tp2) = match params.target_split {
            Some(split) => {
                let leg = |pct: Decimal| -> Result<TargetLeg, SizingError> {
                    let pips = target_pips * pct / Decimal::ONE_HUNDRED;
                    Ok(TargetLeg {
                        pips,
                        price: direction.toward_profit(entry, pips * pip_size),
                        amount: checked_div(
                            checked_mul(risk_amount, pips, "target leg amount")?,
                            stop_pips,
                            "target leg amount",
                        )?,
                    })
                };
                (Some(leg(split.tp1_pct)?), Some(leg(split.tp2_pct)?))
            }
            None => (None, None),
        };

        Ok(TradeResult {
            risk_amount,
            reward_amount,
            position_size,
            exact_position_size,
            stop_loss_price,
            take_profit_price,
            stop_pips,
            target_pips,
            risk_reward_ratio,
            pip_value,
            breakeven,
            tp1,
            tp2,
        })
    }

    /// Size a trade with the take-profit split into two legs.
    ///
    /// Each leg takes `tpN_pct` percent of the full target distance, and its
    /// amount scales with that distance relative to the stop.
    ///
    /// # Errors
    ///
    /// Same as [`TradeSizer::size`], plus a validation error for an invalid
    /// split.
    pub fn size_with_targets(
        &self,
        params: &TradeParameters,
        tp1_pct: Decimal,
        tp2_pct: Decimal,
    ) -> Result<TradeResult, SizingError> {
        let params = TradeParameters {
            target_split: Some(TargetSplit::new(tp1_pct, tp2_pct)),
            ..params.clone()
        };
        self.size(&params)
    }

    fn validate_input(params: &TradeParameters) -> Result<(), ValidationError> {
        if params.account_balance <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveBalance {
                value: params.account_balance,
            });
        }
        if params.risk_percent <= Decimal::ZERO || params.risk_percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::RiskOutOfRange {
                value: params.risk_percent,
            });
        }
        if params.entry_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveEntry {
                value: params.entry_price,
            });
        }
        if params.contract_size < Decimal::ZERO {
            return Err(ValidationError::NegativeContractSize {
                value: params.contract_size,
            });
        }
        if params.fee_percent < Decimal::ZERO || params.spread_pips < Decimal::ZERO {
            return Err(ValidationError::NegativeCost {
                fee_percent: params.fee_percent,
                spread_pips: params.spread_pips,
            });
        }

        let entry = params.entry_price;
        let direction = params.direction;

        match params.stop {
            StopSpec::Pips(value) | StopSpec::Price(value) if value <= Decimal::ZERO => {
                return Err(ValidationError::NonPositiveStop { value });
            }
            StopSpec::Price(price) if !is_loss_side(direction, entry, price) => {
                return Err(ValidationError::WrongSide {
                    level: "stop loss",
                    price,
                    entry,
                    direction,
                });
            }
            _ => {}
        }

        match params.target {
            TargetSpec::Pips(value) | TargetSpec::Price(value) | TargetSpec::RiskReward(value)
                if value <= Decimal::ZERO =>
            {
                return Err(ValidationError::NonPositiveTarget { value });
            }
            TargetSpec::Price(price) if !is_profit_side(direction, entry, price) => {
                return Err(ValidationError::WrongSide {
                    level: "take profit",
                    price,
                    entry,
                    direction,
                });
            }
            _ => {}
        }

        match params.target_split {
            Some(split) if !split.is_valid() => Err(ValidationError::InvalidTargetSplit {
                tp1_pct: split.tp1_pct,
                tp2_pct: split.tp2_pct,
            }),
            _ => Ok(()),
        }
    }

    fn breakeven(
        params: &TradeParameters,
        pip_value: Decimal,
    ) -> Result<Option<Breakeven>, SizingError> {
        if params.fee_percent.is_zero() && params.spread_pips.is_zero() {
            return Ok(None);
        }

        let fee_amount = params.fee_percent / Decimal::ONE_HUNDRED * params.account_balance;
        let pips = params.spread_pips + checked_div(fee_amount, pip_value, "breakeven pips")?;
        let price = params
            .direction
            .toward_profit(params.entry_price, pips * params.instrument.pip_size());

        Ok(Some(Breakeven { pips, price }))
    }

    fn round_lots(&self, size: Decimal) -> Decimal {
        size.round_dp_with_strategy(
            self.config.lot_precision,
            RoundingStrategy::MidpointAwayFromZero,
        )
    }
}

/// Stop prices sit at or beyond entry on the losing side.
fn is_loss_side(direction: PositionDirection, entry: Decimal, price: Decimal) -> bool {
    match direction {
        PositionDirection::Long => price <= entry,
        PositionDirection::Short => price >= entry,
    }
}

fn is_profit_side(direction: PositionDirection, entry: Decimal, price: Decimal) -> bool {
    match direction {
        PositionDirection::Long => price > entry,
        PositionDirection::Short => price < entry,
    }
}

fn checked_mul(a: Decimal, b: Decimal, quantity: &'static str) -> Result<Decimal, SizingError> {
    a.checked_mul(b)
        .ok_or(SizingError::Calculation(CalculationError::Overflow { quantity }))
}

fn checked_div(a: Decimal, b: Decimal, quantity: &'static str) -> Result<Decimal, SizingError> {
    if b.is_zero() {
        return Err(CalculationError::ZeroStopDistance.into());
    }
    a.checked_div(b)
        .ok_or(SizingError::Calculation(CalculationError::Overflow { quantity }))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::risk::sizing::types::{Instrument, LotSize};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn default_params() -> TradeParameters {
        TradeParameters::new(
            dec!(10000),
            dec!(1),
            dec!(1.1000),
            PositionDirection::Long,
            StopSpec::Pips(dec!(10)),
            TargetSpec::Pips(dec!(20)),
        )
    }

    #[test]
    fn test_forex_pip_sizing() {
        let sizer = TradeSizer::default();
        let result = sizer
            .size(&default_params())
            .expect("should size forex trade");

        assert_eq!(result.risk_amount, dec!(100));
        assert_eq!(result.pip_value, dec!(10));
        assert_eq!(result.position_size, dec!(1));
        assert_eq!(result.risk_reward_ratio, dec!(2));
        assert_eq!(result.reward_amount, dec!(200));
        assert_eq!(result.stop_loss_price, dec!(1.0990));
        assert_eq!(result.take_profit_price, dec!(1.1020));
        assert!(result.breakeven.is_none());
        assert!(!result.has_multiple_targets());
    }

    #[test]
    fn test_short_trade_prices_mirror_long() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            direction: PositionDirection::Short,
            ..default_params()
        };
        let result = sizer.size(&params).expect("should size short trade");

        assert_eq!(result.stop_loss_price, dec!(1.1010));
        assert_eq!(result.take_profit_price, dec!(1.0980));
    }

    #[test]
    fn test_price_based_stop_and_target_derive_ratio() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            stop: StopSpec::Price(dec!(1.0985)),
            target: TargetSpec::Price(dec!(1.1045)),
            ..default_params()
        };
        let result = sizer.size(&params).expect("should size price-based trade");

        assert_eq!(result.stop_pips, dec!(15));
        assert_eq!(result.target_pips, dec!(45));
        assert_eq!(result.risk_reward_ratio, dec!(3));
        assert_eq!(result.reward_amount, dec!(300));
        assert_eq!(result.stop_loss_price, dec!(1.0985));
        // 100 / (10 * 15) = 0.6666.. -> 0.67
        assert_eq!(result.position_size, dec!(0.67));
    }

    #[test]
    fn test_risk_reward_target() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            target: TargetSpec::RiskReward(dec!(2.5)),
            ..default_params()
        };
        let result = sizer.size(&params).expect("should size ratio target");

        assert_eq!(result.target_pips, dec!(25));
        assert_eq!(result.take_profit_price, dec!(1.1025));
        assert_eq!(result.reward_amount, dec!(250));
    }

    #[test]
    fn test_gold_uses_coarse_pip_scale() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            entry_price: dec!(2000),
            instrument: Instrument::Gold,
            ..default_params()
        };
        let result = sizer.size(&params).expect("should size gold trade");

        assert_eq!(result.pip_value, dec!(100));
        assert_eq!(result.stop_loss_price, dec!(1999));
        assert_eq!(result.take_profit_price, dec!(2002));
        assert_eq!(result.position_size, dec!(0.1));
    }

    #[test]
    fn test_micro_lot_and_custom_contract() {
        let sizer = TradeSizer::default();
        let micro = TradeParameters {
            lot_size: LotSize::Micro,
            ..default_params()
        };
        let result = sizer.size(&micro).expect("should size micro lot");
        assert_eq!(result.position_size, dec!(100));

        let custom = TradeParameters {
            contract_size: dec!(50000),
            ..default_params()
        };
        let result = sizer.size(&custom).expect("should size custom contract");
        assert_eq!(result.pip_value, dec!(5));
        assert_eq!(result.position_size, dec!(2));
    }

    #[test]
    fn test_multi_target_split() {
        let sizer = TradeSizer::default();
        let result = sizer
            .size_with_targets(&default_params(), dec!(60), dec!(40))
            .expect("should size split targets");

        let (Some(tp1), Some(tp2)) = (result.tp1, result.tp2) else {
            panic!("both legs should be present");
        };
        assert_eq!(tp1.pips, dec!(12));
        assert_eq!(tp1.price, dec!(1.1012));
        assert_eq!(tp1.amount, dec!(120));
        assert_eq!(tp2.pips, dec!(8));
        assert_eq!(tp2.amount, dec!(80));
    }

    #[test]
    fn test_invalid_split_rejected() {
        let sizer = TradeSizer::default();
        let result = sizer.size_with_targets(&default_params(), dec!(80), dec!(40));

        assert!(matches!(
            result,
            Err(SizingError::Validation(
                ValidationError::InvalidTargetSplit { .. }
            ))
        ));
    }

    #[test]
    fn test_breakeven_with_fee_and_spread() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            fee_percent: dec!(0.1),
            spread_pips: dec!(2),
            ..default_params()
        };
        let result = sizer.size(&params).expect("should size with costs");

        let Some(breakeven) = result.breakeven else {
            panic!("breakeven should be modeled when costs are set");
        };
        // fee = 10 -> 10 / 10 per pip = 1 pip, plus 2 pips spread
        assert_eq!(breakeven.pips, dec!(3));
        assert_eq!(breakeven.price, dec!(1.1003));
    }

    #[test]
    fn test_validation_errors() {
        let sizer = TradeSizer::default();

        let cases = [
            TradeParameters {
                account_balance: dec!(0),
                ..default_params()
            },
            TradeParameters {
                risk_percent: dec!(100.5),
                ..default_params()
            },
            TradeParameters {
                entry_price: dec!(-1),
                ..default_params()
            },
            TradeParameters {
                stop: StopSpec::Pips(dec!(0)),
                ..default_params()
            },
            TradeParameters {
                target: TargetSpec::RiskReward(dec!(0)),
                ..default_params()
            },
            TradeParameters {
                contract_size: dec!(-5),
                ..default_params()
            },
            TradeParameters {
                stop: StopSpec::Price(dec!(1.2000)),
                ..default_params()
            },
        ];

        for params in cases {
            assert!(
                matches!(sizer.size(&params), Err(SizingError::Validation(_))),
                "expected validation error for {params:?}"
            );
        }
    }

    #[test]
    fn test_stop_at_entry_is_calculation_error() {
        let sizer = TradeSizer::default();
        let params = TradeParameters {
            stop: StopSpec::Price(dec!(1.1000)),
            ..default_params()
        };

        assert_eq!(
            sizer.size(&params),
            Err(SizingError::Calculation(CalculationError::ZeroStopDistance))
        );
    }

    proptest! {
        #[test]
        fn prop_exact_size_reproduces_risk(
            balance in 100u32..10_000_000,
            risk_bp in 1u32..=10_000,
            stop_tenths in 1u32..5_000,
            instrument_idx in 0usize..3,
            lot_idx in 0usize..3,
        ) {
            let params = TradeParameters {
                account_balance: Decimal::from(balance),
                risk_percent: Decimal::new(i64::from(risk_bp), 2),
                stop: StopSpec::Pips(Decimal::new(i64::from(stop_tenths), 1)),
                instrument: Instrument::ALL[instrument_idx],
                lot_size: LotSize::ALL[lot_idx],
                entry_price: dec!(5000),
                ..default_params()
            };
            let result = TradeSizer::default().size(&params).expect("valid params size");

            let rebuilt = result.exact_position_size * result.stop_pips * result.pip_value;
            let relative = ((rebuilt - result.risk_amount) / result.risk_amount).abs();
            prop_assert!(relative <= dec!(0.000001));
        }
    }
}
