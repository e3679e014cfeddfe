//! Contract parameters and contract block loading

mod data;
pub mod loader;

pub use data::{Contract, PaymentFrequency, Sex};
pub use loader::{load_contracts, load_contracts_from_reader};
