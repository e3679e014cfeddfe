//! Mortality tables and table file loading

pub mod loader;
mod mortality;

pub use loader::{load_named_table, load_table, load_table_from_reader};
pub use mortality::{MortalityTable, MAX_AGE};
