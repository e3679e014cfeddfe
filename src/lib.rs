//! Life PV - actuarial present values, projections and reserves for life insurance
//!
//! This library provides:
//! - Mortality tables with point and range queries
//! - Survival and death probabilities over several years
//! - Life annuities-due (whole life, temporary, deferred, with k payments a year)
//! - Death benefit, pure endowment and endowment present values
//! - Commutation columns with a (sex, rate) cache
//! - Projections of every present value over the contract term, with net premium reserves
//! - A batch runner valuing many contracts against one shared table

pub mod contract;
pub mod error;
pub mod finance;
pub mod present_values;
pub mod projection;
pub mod scenario;
pub mod survival;
pub mod tables;

// Re-export commonly used types
pub use contract::{Contract, PaymentFrequency, Sex};
pub use error::{ActuarialError, Result};
pub use present_values::{CommutationCache, CommutationTable};
pub use projection::{ProjectionEngine, ProjectionResult, ProjectionRow, ReserveProjection};
pub use scenario::ValuationRunner;
pub use tables::{MortalityTable, MAX_AGE};
