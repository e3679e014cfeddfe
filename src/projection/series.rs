//! Projection output: one row per policy year offset

use serde::{Deserialize, Serialize};

/// Present values at the start of policy year `offset + 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub contract_id: u32,

    // Timing
    pub offset: u32,
    pub attained_age: u32,
    pub remaining_term: u32,

    /// Premium annuity-due, zero from the end of the premium term on
    pub premium_annuity: f64,
    pub death_benefit: f64,
    pub pure_endowment: f64,
    pub endowment: f64,

    /// Net premium reserve per unit sum insured
    pub reserve: f64,
}

/// Complete projection for one contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Contract identifier
    pub contract_id: u32,

    /// Rows for offsets 0..=n; empty when the contract could not be projected
    pub rows: Vec<ProjectionRow>,

    /// Annual net premium rate fixed at issue
    pub net_premium: f64,
}

impl ProjectionResult {
    pub fn new(contract_id: u32) -> Self {
        Self {
            contract_id,
            rows: Vec::new(),
            net_premium: 0.0,
        }
    }

    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reserve series in offset order
    pub fn reserves(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.reserve).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let max_reserve = self
            .rows
            .iter()
            .map(|r| r.reserve)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_reserve = if self.rows.is_empty() { 0.0 } else { max_reserve };

        ProjectionSummary {
            contract_id: self.contract_id,
            total_years: self.rows.len().saturating_sub(1) as u32,
            net_premium: self.net_premium,
            initial_endowment: self.rows.first().map(|r| r.endowment).unwrap_or(0.0),
            max_reserve,
            reserve_at_maturity: self.rows.last().map(|r| r.reserve).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub contract_id: u32,
    pub total_years: u32,
    pub net_premium: f64,
    pub initial_endowment: f64,
    pub max_reserve: f64,
    pub reserve_at_maturity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(offset: u32, reserve: f64) -> ProjectionRow {
        ProjectionRow {
            contract_id: 9,
            offset,
            attained_age: 40 + offset,
            remaining_term: 2 - offset,
            premium_annuity: 0.0,
            death_benefit: 0.0,
            pure_endowment: 0.0,
            endowment: 0.5 + offset as f64,
            reserve,
        }
    }

    #[test]
    fn test_summary() {
        let mut result = ProjectionResult::new(9);
        result.net_premium = 0.3;
        result.add_row(row(0, 0.0));
        result.add_row(row(1, 0.6));
        result.add_row(row(2, 1.0));

        let summary = result.summary();
        assert_eq!(summary.total_years, 2);
        assert_eq!(summary.net_premium, 0.3);
        assert_eq!(summary.initial_endowment, 0.5);
        assert_eq!(summary.max_reserve, 1.0);
        assert_eq!(summary.reserve_at_maturity, 1.0);
        assert_eq!(result.reserves(), vec![0.0, 0.6, 1.0]);
    }

    #[test]
    fn test_empty_summary() {
        let result = ProjectionResult::new(1);
        assert!(result.is_empty());
        let summary = result.summary();
        assert_eq!(summary.total_years, 0);
        assert_eq!(summary.max_reserve, 0.0);
        assert_eq!(summary.reserve_at_maturity, 0.0);
    }
}
