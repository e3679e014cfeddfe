//! Benefit present values: death benefit, pure endowment and their sum

use crate::contract::Sex;
use crate::finance::discount_factor;
use crate::survival::n_year_survival;
use crate::tables::MortalityTable;

/// Term insurance ₙAₓ¹ = Σ_{t=1}^{n} ₜ₋₁pₓ · qₓ₊ₜ₋₁ · vᵗ
///
/// Pays 1 at the end of the year of death within n years. Zero for n = 0
/// and when `age + n` passes the table's highest age.
pub fn term_insurance(table: &MortalityTable, age: u32, n: u32, sex: Sex, rate: f64) -> f64 {
    if n == 0 || !table.covers(age) || !table.ends_within(age, n) {
        return 0.0;
    }

    let qx = table.death_probability_range(age, n, sex);
    discounted_deaths(&qx, discount_factor(rate))
}

/// Σ ₜ₋₁p · q · vᵗ over consecutive one-year death probabilities
pub(crate) fn discounted_deaths(qx: &[f64], v: f64) -> f64 {
    let mut tpx = 1.0;
    let mut vt = 1.0;
    let mut total = 0.0;
    for &q in qx {
        vt *= v;
        total += tpx * q * vt;
        tpx *= 1.0 - q;
    }
    total
}

/// Pure endowment ₙEₓ = ₙpₓ · vⁿ
///
/// n = 0 is a benefit due now with certainty and returns 1.0. A maturity
/// beyond the table's highest age returns 0.0.
pub fn pure_endowment(table: &MortalityTable, age: u32, n: u32, sex: Sex, rate: f64) -> f64 {
    if n == 0 {
        return 1.0;
    }
    if !table.covers(age) || !table.ends_within(age, n) {
        return 0.0;
    }
    n_year_survival(table, age, n, sex) * discount_factor(rate).powi(n as i32)
}

/// Endowment insurance Aₓ:ₙ = ₙAₓ¹ + ₙEₓ
pub fn endowment(table: &MortalityTable, age: u32, n: u32, sex: Sex, rate: f64) -> f64 {
    term_insurance(table, age, n, sex, rate) + pure_endowment(table, age, n, sex, rate)
}
