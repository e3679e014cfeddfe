//! Projection of present values and reserves over the contract term

mod engine;
mod reserve;
mod series;

pub use engine::ProjectionEngine;
pub use reserve::ReserveProjection;
pub use series::{ProjectionResult, ProjectionRow, ProjectionSummary};
