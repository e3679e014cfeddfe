//! Valuation runner for batch projections
//!
//! Holds one mortality table and values many contracts against it without
//! reloading or copying the table.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::contract::Contract;
use crate::error::Result;
use crate::projection::{ProjectionEngine, ProjectionResult};
use crate::tables::{load_table, MortalityTable};

/// Shared-table runner for single, batch and rate-sensitivity valuations
///
/// # Example
/// ```ignore
/// let runner = ValuationRunner::new();
///
/// // Re-value one contract at several technical rates
/// let results = runner.run_rates(&contract, &[0.0125, 0.0175, 0.025]);
/// ```
#[derive(Debug, Clone)]
pub struct ValuationRunner {
    engine: ProjectionEngine,
}

impl ValuationRunner {
    /// Create runner with the built-in table
    pub fn new() -> Self {
        Self::with_table(Arc::new(MortalityTable::iam_2012_basic()))
    }

    /// Create runner by loading a table file
    pub fn from_table_path(path: &Path) -> Result<Self> {
        Ok(Self::with_table(Arc::new(load_table(path)?)))
    }

    /// Create runner with a pre-built table
    pub fn with_table(table: Arc<MortalityTable>) -> Self {
        Self {
            engine: ProjectionEngine::new(table),
        }
    }

    /// Project a single contract
    pub fn run(&self, contract: &Contract) -> ProjectionResult {
        self.engine.project(contract)
    }

    /// Project independent contracts in parallel; results keep the input order
    pub fn run_batch(&self, contracts: &[Contract]) -> Vec<ProjectionResult> {
        log::info!("projecting {} contracts", contracts.len());
        contracts
            .par_iter()
            .map(|contract| self.engine.project(contract))
            .collect()
    }

    /// Project one contract at each of several interest rates
    pub fn run_rates(&self, contract: &Contract, rates: &[f64]) -> Vec<ProjectionResult> {
        rates
            .iter()
            .map(|&rate| {
                let mut scenario = contract.clone();
                scenario.interest_rate = rate;
                self.engine.project(&scenario)
            })
            .collect()
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Table shared by every valuation
    pub fn table(&self) -> &MortalityTable {
        self.engine.table()
    }
}

impl Default for ValuationRunner {
    fn default() -> Self {
        Self::new()
    }
}
