pub mod calculator;
pub mod ledger;
pub mod policy;

pub use calculator::{PositionState, TaxCalculator};
pub use policy::{CalculatorOptions, OversellPolicy};
