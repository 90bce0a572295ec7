//! Risk management: trade sizing, risk profiles and simulated risk curves.

mod curve;
mod profile;
pub mod sizing;

pub use curve::{RiskCurveError, RiskCurveGenerator, RiskSimulationParams, RiskSimulationResult};
pub use profile::{RiskProfile, RiskStrategy, risk_percent};
