//! Trade sizing: risk amount, position size and concrete stop/target prices.
//!
//! Supports three instrument classes with their own pip scale:
//! - `FOREX`: 0.0001 per pip
//! - `GOLD`: 0.1 per pip
//! - `INDICES`: 0.1 per pip
//!
//! # Example
//!
//! ```rust,ignore
//! use strategy_backtester::risk::sizing::{
//!     PositionDirection, StopSpec, TargetSpec, TradeParameters, TradeSizer,
//! };
//! use rust_decimal_macros::dec;
//!
//! let params = TradeParameters::new(
//!     dec!(10000),               // balance
//!     dec!(1),                   // risk 1%
//!     dec!(1.1000),              // entry
//!     PositionDirection::Long,
//!     StopSpec::Pips(dec!(10)),
//!     TargetSpec::Pips(dec!(20)),
//! );
//!
//! let result = TradeSizer::default().size(&params)?;
//! assert_eq!(result.position_size, dec!(1)); // 100 / (10 per pip * 10 pips)
//! ```

mod error;
mod pip_table;
mod sizer;
mod types;

pub use error::{CalculationError, SizingError, ValidationError};
pub use pip_table::{PipTable, pip_value, pip_value_for_units};
pub use sizer::{TradeSizer, TradeSizerConfig};
pub use types::{
    Breakeven, Instrument, LotSize, PositionDirection, StopSpec, TargetLeg, TargetSpec,
    TargetSplit, TradeParameters, TradeResult,
};
