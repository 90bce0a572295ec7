//! Pip values over the finite instrument x lot-size domain.
//!
//! The table is built once on first use and never mutated, so it can be
//! shared across worker threads without locking.

use std::sync::OnceLock;

use rust_decimal::Decimal;

use super::types::{Instrument, LotSize};

/// Precomputed pip values indexed by instrument and lot size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipTable {
    values: [[Decimal; 3]; 3],
}

impl PipTable {
    /// Shared table instance.
    pub fn global() -> &'static Self {
        static TABLE: OnceLock<PipTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut values = [[Decimal::ZERO; 3]; 3];
        for instrument in Instrument::ALL {
            for lot in LotSize::ALL {
                values[instrument.index()][lot.index()] =
                    pip_value_for_units(instrument, lot.units());
            }
        }
        Self { values }
    }

    /// Pip value for a standard lot convention.
    #[must_use]
    pub const fn get(&self, instrument: Instrument, lot: LotSize) -> Decimal {
        self.values[instrument.index()][lot.index()]
    }
}

/// Pip value of a contract holding `units` base units.
///
/// Forex pips are worth 0.0001 per unit. Gold and index contracts quote per
/// hundred units at 0.1 and 1.0 respectively.
#[must_use]
pub fn pip_value_for_units(instrument: Instrument, units: Decimal) -> Decimal {
    match instrument {
        Instrument::Forex => units * Decimal::new(1, 4),
        Instrument::Gold => units * Decimal::new(1, 1) / Decimal::ONE_HUNDRED,
        Instrument::Indices => units / Decimal::ONE_HUNDRED,
    }
}

/// Pip value for a trade, honoring a custom contract size when positive.
#[must_use]
pub fn pip_value(instrument: Instrument, lot: LotSize, contract_size: Decimal) -> Decimal {
    if contract_size > Decimal::ZERO {
        pip_value_for_units(instrument, contract_size)
    } else {
        PipTable::global().get(instrument, lot)
    }
}
