//! Projection engine: present values for every policy year of a contract
//!
//! The scalar functions in `present_values` restart their survival products
//! at every call. Projecting a contract over n years that way costs O(n²)
//! table lookups. The engine fetches the one-year rates for [age, age + n)
//! once and derives every offset from them:
//!
//! - annuities: one local cumulative product per offset over the shared rates
//! - death benefit: suffix sums over the survival vector from entry age,
//!   rescaled by ₘpₓ · vᵐ
//! - pure endowment: the ratio ₙpₓ / ₘpₓ
//!
//! The series agree with the scalar functions evaluated at (age + m, n - m).
//! Out-of-range requests return an empty series instead of failing.

use std::sync::Arc;

use super::series::{ProjectionResult, ProjectionRow};
use crate::contract::{Contract, Sex};
use crate::finance::{discount_factor, fractional_payment_adjustment};
use crate::present_values::{discounted_deaths, discounted_sum};
use crate::tables::MortalityTable;

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    table: Arc<MortalityTable>,
}

impl ProjectionEngine {
    /// Create a new projection engine over a shared table
    pub fn new(table: Arc<MortalityTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &MortalityTable {
        &self.table
    }

    /// Temporary annuity-due äₓ₊ₘ:ₙ₋ₘ⁽ᵏ⁾ for m = 0..n (n entries)
    pub fn annuity_series(&self, age: u32, n: u32, sex: Sex, rate: f64, k: u32) -> Vec<f64> {
        if !self.in_range(age, n, "annuity") {
            return Vec::new();
        }
        if k == 0 {
            return vec![0.0; n as usize];
        }

        let v = discount_factor(rate);
        let beta = fractional_payment_adjustment(k, rate);
        let reaches_ceiling = !self.table.ends_before_ceiling(age, n);
        let px_all = self.table.survival_probability_range(age, n, sex);

        let mut series = Vec::with_capacity(n as usize);
        for m in 0..n as usize {
            let tpx = cumulative_survival(&px_all[m..]);
            let remaining = tpx.len() - 1;

            let annual = discounted_sum(&tpx[..remaining], v);
            let end_survival = if reaches_ceiling { 1.0 } else { tpx[remaining] };
            series.push(annual - beta * (1.0 - end_survival * v.powi(remaining as i32)));
        }

        log::debug!("annuity series: age {} term {} ({} offsets)", age, n, series.len());
        series
    }

    /// Term insurance ₙ₋ₘAₓ₊ₘ¹ for m = 0..=n; the last entry is 0
    pub fn death_benefit_series(&self, age: u32, n: u32, sex: Sex, rate: f64) -> Vec<f64> {
        if !self.in_range(age, n, "death benefit") {
            return Vec::new();
        }

        let n = n as usize;
        let v = discount_factor(rate);
        let qx_all = self.table.death_probability_range(age, n as u32, sex);
        let px_all: Vec<f64> = qx_all.iter().map(|q| 1.0 - q).collect();
        let tpx_all = cumulative_survival(&px_all);

        // suffix[m] = Σ_{j>=m} ⱼpₓ · qₓ₊ⱼ · vʲ⁺¹
        let mut suffix = vec![0.0; n + 1];
        for j in (0..n).rev() {
            suffix[j] = suffix[j + 1] + tpx_all[j] * qx_all[j] * v.powi(j as i32 + 1);
        }

        let mut series = Vec::with_capacity(n + 1);
        for m in 0..n {
            let base = tpx_all[m] * v.powi(m as i32);
            if base > 0.0 {
                series.push(suffix[m] / base);
            } else {
                // Nobody alive at offset m on the entry-age vector; restart locally
                series.push(discounted_deaths(&qx_all[m..], v));
            }
        }
        series.push(0.0);
        series
    }

    /// Pure endowment ₙ₋ₘEₓ₊ₘ for m = 0..=n; the last entry is 1
    pub fn pure_endowment_series(&self, age: u32, n: u32, sex: Sex, rate: f64) -> Vec<f64> {
        if !self.in_range(age, n, "pure endowment") {
            return Vec::new();
        }

        let n = n as usize;
        let v = discount_factor(rate);
        let reaches_ceiling = !self.table.ends_before_ceiling(age, n as u32);
        let px_all = self.table.survival_probability_range(age, n as u32, sex);
        let tpx_all = cumulative_survival(&px_all);

        let mut series = Vec::with_capacity(n + 1);
        for m in 0..n {
            let survival = if reaches_ceiling {
                1.0
            } else if tpx_all[m] > 0.0 {
                tpx_all[n] / tpx_all[m]
            } else {
                px_all[m..].iter().product()
            };
            series.push(survival * v.powi((n - m) as i32));
        }
        series.push(1.0);
        series
    }

    /// Endowment insurance Aₓ₊ₘ:ₙ₋ₘ for m = 0..=n
    pub fn endowment_series(&self, age: u32, n: u32, sex: Sex, rate: f64) -> Vec<f64> {
        let death = self.death_benefit_series(age, n, sex, rate);
        let survival = self.pure_endowment_series(age, n, sex, rate);
        death.iter().zip(&survival).map(|(a, e)| a + e).collect()
    }

    /// Project a contract: one row per offset 0..=term
    pub fn project(&self, contract: &Contract) -> ProjectionResult {
        let mut result = ProjectionResult::new(contract.contract_id);

        let projection = match self.reserve_projection(
            contract.entry_age,
            contract.term,
            contract.premium_term(),
            contract.sex,
            contract.interest_rate,
            contract.k(),
        ) {
            Some(projection) => projection,
            None => {
                log::warn!("contract {}: nothing projected", contract.contract_id);
                return result;
            }
        };

        result.net_premium = projection.net_premium;
        for m in 0..=contract.term {
            let idx = m as usize;
            let death_benefit = projection.death_benefit[idx];
            let pure_endowment = projection.pure_endowment[idx];
            result.add_row(ProjectionRow {
                contract_id: contract.contract_id,
                offset: m,
                attained_age: contract.attained_age(m),
                remaining_term: contract.remaining_term(m),
                premium_annuity: projection.premium_annuity[idx],
                death_benefit,
                pure_endowment,
                endowment: death_benefit + pure_endowment,
                reserve: projection.reserve[idx],
            });
        }

        result
    }

    /// Whether [age, age + n] lies in the table; logs a warning when it does not
    fn in_range(&self, age: u32, n: u32, series: &str) -> bool {
        if n > 0 && self.table.covers(age) && self.table.ends_within(age, n) {
            return true;
        }
        log::warn!(
            "{} series: age {} term {} outside table '{}' (ages {}-{}), returning empty",
            series,
            age,
            n,
            self.table.name(),
            self.table.min_age(),
            self.table.max_age()
        );
        false
    }
}

/// Cumulative survival from one-year rates: [1, p₀, p₀p₁, ...]
fn cumulative_survival(px: &[f64]) -> Vec<f64> {
    let mut tpx = Vec::with_capacity(px.len() + 1);
    tpx.push(1.0);
    let mut running = 1.0;
    for &p in px {
        running *= p;
        tpx.push(running);
    }
    tpx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present_values::{pure_endowment, temporary_annuity, temporary_annuity_k, term_insurance};
    use approx::assert_abs_diff_eq;

    const RATE: f64 = 0.0175;

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Arc::new(MortalityTable::iam_2012_basic()))
    }

    #[test]
    fn test_annuity_series_matches_scalar() {
        let engine = engine();
        let series = engine.annuity_series(40, 20, Sex::Male, RATE, 1);
        assert_eq!(series.len(), 20);

        for (m, &value) in series.iter().enumerate() {
            let m = m as u32;
            let scalar = temporary_annuity(engine.table(), 40 + m, 20 - m, Sex::Male, RATE);
            assert_abs_diff_eq!(value, scalar, epsilon = 1e-10);
        }
        assert_eq!(series[19], 1.0);
    }

    #[test]
    fn test_annuity_series_with_frequency_matches_scalar() {
        let engine = engine();
        for k in [2, 4, 12] {
            let series = engine.annuity_series(55, 30, Sex::Female, RATE, k);
            for (m, &value) in series.iter().enumerate() {
                let m = m as u32;
                let scalar = temporary_annuity_k(engine.table(), 55 + m, 30 - m, Sex::Female, RATE, k);
                assert_abs_diff_eq!(value, scalar, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_series_match_scalar_up_to_ceiling() {
        let engine = engine();
        let omega = engine.table().max_age();
        let age = omega - 15;

        let annuities = engine.annuity_series(age, 15, Sex::Male, RATE, 12);
        let deaths = engine.death_benefit_series(age, 15, Sex::Male, RATE);
        let survivals = engine.pure_endowment_series(age, 15, Sex::Male, RATE);

        for m in 0..15u32 {
            let idx = m as usize;
            let x = age + m;
            let r = 15 - m;
            assert_abs_diff_eq!(
                annuities[idx],
                temporary_annuity_k(engine.table(), x, r, Sex::Male, RATE, 12),
                epsilon = 1e-10
            );
            assert_abs_diff_eq!(deaths[idx], term_insurance(engine.table(), x, r, Sex::Male, RATE), epsilon = 1e-10);
            assert_abs_diff_eq!(survivals[idx], pure_endowment(engine.table(), x, r, Sex::Male, RATE), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_benefit_series_match_scalar() {
        let engine = engine();
        let deaths = engine.death_benefit_series(40, 20, Sex::Male, RATE);
        let survivals = engine.pure_endowment_series(40, 20, Sex::Male, RATE);
        assert_eq!(deaths.len(), 21);
        assert_eq!(survivals.len(), 21);

        for m in 0..=20u32 {
            let idx = m as usize;
            assert_abs_diff_eq!(
                deaths[idx],
                term_insurance(engine.table(), 40 + m, 20 - m, Sex::Male, RATE),
                epsilon = 1e-10
            );
            assert_abs_diff_eq!(
                survivals[idx],
                pure_endowment(engine.table(), 40 + m, 20 - m, Sex::Male, RATE),
                epsilon = 1e-10
            );
        }
        assert_eq!(deaths[20], 0.0);
        assert_eq!(survivals[20], 1.0);
    }

    #[test]
    fn test_endowment_series_identity() {
        let engine = engine();
        let v = discount_factor(RATE);
        let endowments = engine.endowment_series(30, 35, Sex::Female, RATE);
        let annuities = engine.annuity_series(30, 35, Sex::Female, RATE, 1);

        for (m, annuity) in annuities.iter().enumerate() {
            assert_abs_diff_eq!(endowments[m], 1.0 - (1.0 - v) * annuity, epsilon = 1e-12);
        }
        assert_eq!(endowments[35], 1.0);
    }

    #[test]
    fn test_degenerate_projection_is_empty() {
        let engine = engine();
        assert!(engine.annuity_series(40, 0, Sex::Male, RATE, 1).is_empty());
        assert!(engine.death_benefit_series(40, 0, Sex::Male, RATE).is_empty());
        assert!(engine.pure_endowment_series(40, 0, Sex::Male, RATE).is_empty());
        assert!(engine.endowment_series(110, 20, Sex::Male, RATE).is_empty());
        assert!(engine.annuity_series(110, 20, Sex::Male, RATE, 1).is_empty());
    }

    #[test]
    fn test_terms_near_u32_max_are_empty() {
        let engine = engine();
        let max = u32::MAX;
        assert!(engine.annuity_series(40, max, Sex::Male, RATE, 12).is_empty());
        assert!(engine.annuity_series(max, 1, Sex::Male, RATE, 1).is_empty());
        assert!(engine.death_benefit_series(40, max, Sex::Female, RATE).is_empty());
        assert!(engine.pure_endowment_series(40, max, Sex::Female, RATE).is_empty());
        assert!(engine.endowment_series(max, max, Sex::Male, RATE).is_empty());
        assert!(engine.reserve(40, max, max, Sex::Male, RATE, 1).is_empty());
        assert!(engine.reserve(40, max, 10, Sex::Male, RATE, 1).is_empty());

        let result = engine.project(&Contract::new(5, 40, Sex::Male, RATE, max));
        assert!(result.is_empty());
    }

    #[test]
    fn test_early_certain_death_falls_back_to_local_products() {
        // Everyone alive at 61 dies during that year; the ages after restart with their own rates
        let table = MortalityTable::from_rows(
            "Cliff",
            vec![
                (60, 0.1, 0.1),
                (61, 1.0, 1.0),
                (62, 0.2, 0.2),
                (63, 0.3, 0.3),
                (64, 0.4, 0.4),
                (65, 1.0, 1.0),
            ],
        )
        .unwrap();
        let engine = ProjectionEngine::new(Arc::new(table));

        let deaths = engine.death_benefit_series(60, 4, Sex::Male, RATE);
        let survivals = engine.pure_endowment_series(60, 4, Sex::Male, RATE);
        for m in 0..=4u32 {
            let idx = m as usize;
            assert_abs_diff_eq!(
                deaths[idx],
                term_insurance(engine.table(), 60 + m, 4 - m, Sex::Male, RATE),
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(
                survivals[idx],
                pure_endowment(engine.table(), 60 + m, 4 - m, Sex::Male, RATE),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_project_contract_rows() {
        let engine = engine();
        let contract = Contract::new(3, 40, Sex::Male, RATE, 20).with_premium_term(15);
        let result = engine.project(&contract);

        assert_eq!(result.rows.len(), 21);
        assert_eq!(result.rows[0].attained_age, 40);
        assert_eq!(result.rows[20].remaining_term, 0);
        assert_eq!(result.rows[15].premium_annuity, 0.0);
        assert!(result.rows[14].premium_annuity > 0.0);
        assert!(result.net_premium > 0.0);
        assert_abs_diff_eq!(result.rows[0].reserve, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.rows[20].reserve, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_out_of_range_contract() {
        let engine = engine();
        let result = engine.project(&Contract::new(4, 110, Sex::Female, RATE, 20));
        assert!(result.is_empty());
        assert_eq!(result.net_premium, 0.0);
    }
}
