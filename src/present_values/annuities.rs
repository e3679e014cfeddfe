//! Life annuities-due: payments at the start of each period while the insured is alive
//!
//! All values are per unit of annual payment. With k payments a year the
//! annual amount is split into k instalments and the Woolhouse correction
//! from `finance` is applied.

use crate::contract::Sex;
use crate::finance::{discount_factor, fractional_payment_adjustment};
use crate::survival::{n_year_survival, survival_matrix};
use crate::tables::MortalityTable;

/// Σ ₜpₓ · vᵗ over a cumulative survival vector
pub(crate) fn discounted_sum(tpx: &[f64], v: f64) -> f64 {
    let mut vt = 1.0;
    let mut total = 0.0;
    for &p in tpx {
        total += p * vt;
        vt *= v;
    }
    total
}

/// Whole-life annuity-due äₓ = Σ_{t=0}^{ω-x-1} ₜpₓ · vᵗ
///
/// Zero for ages outside the table and at the ceiling ω.
pub fn whole_life_annuity(table: &MortalityTable, age: u32, sex: Sex, rate: f64) -> f64 {
    if !table.covers(age) || age >= table.max_age() {
        return 0.0;
    }
    let horizon = table.max_age() - age;
    let tpx = survival_matrix(table, age, horizon - 1, sex);
    discounted_sum(&tpx, discount_factor(rate))
}

/// Whole-life annuity-due with k payments a year: äₓ⁽ᵏ⁾ = äₓ - β(k, i)
pub fn whole_life_annuity_k(table: &MortalityTable, age: u32, sex: Sex, rate: f64, k: u32) -> f64 {
    if k == 0 || !table.covers(age) || age >= table.max_age() {
        return 0.0;
    }
    whole_life_annuity(table, age, sex, rate) - fractional_payment_adjustment(k, rate)
}

/// Temporary annuity-due äₓ:ₙ = Σ_{t=0}^{n-1} ₜpₓ · vᵗ
///
/// A term reaching past the ceiling is cut to `ω - x` years.
pub fn temporary_annuity(table: &MortalityTable, age: u32, n: u32, sex: Sex, rate: f64) -> f64 {
    match effective_term(table, age, n) {
        Some(n_eff) => {
            let tpx = survival_matrix(table, age, n_eff - 1, sex);
            discounted_sum(&tpx, discount_factor(rate))
        }
        None => 0.0,
    }
}

/// Temporary annuity-due with k payments a year
///
/// äₓ:ₙ⁽ᵏ⁾ = äₓ:ₙ - β(k, i) · (1 - ₙpₓ · vⁿ)
pub fn temporary_annuity_k(
    table: &MortalityTable,
    age: u32,
    n: u32,
    sex: Sex,
    rate: f64,
    k: u32,
) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let n_eff = match effective_term(table, age, n) {
        Some(n_eff) => n_eff,
        None => return 0.0,
    };

    let v = discount_factor(rate);
    let annual = temporary_annuity(table, age, n_eff, sex, rate);
    let end_value = n_year_survival(table, age, n_eff, sex) * v.powi(n_eff as i32);
    annual - fractional_payment_adjustment(k, rate) * (1.0 - end_value)
}

/// Whole-life annuity-due deferred d years: ₔ|äₓ⁽ᵏ⁾ = ₔpₓ · vᵈ · äₓ₊ₔ⁽ᵏ⁾
///
/// Zero for d = 0 (use `whole_life_annuity_k`) or when `age + d` passes the ceiling.
pub fn deferred_whole_life_annuity(
    table: &MortalityTable,
    age: u32,
    deferment: u32,
    sex: Sex,
    rate: f64,
    k: u32,
) -> f64 {
    if k == 0 || deferment == 0 || !table.ends_within(age, deferment) {
        return 0.0;
    }
    let v = discount_factor(rate);
    n_year_survival(table, age, deferment, sex)
        * v.powi(deferment as i32)
        * whole_life_annuity_k(table, age + deferment, sex, rate, k)
}

/// Temporary annuity-due over years d..n, deferred d years
///
/// ₔ|äₓ:ₙ⁽ᵏ⁾ = ₔpₓ · vᵈ · äₓ₊ₔ:ₙ₋ₔ⁽ᵏ⁾, where n is the total term including deferment.
/// Zero unless 0 < d ≤ n and `age + n` lies within the table.
pub fn deferred_temporary_annuity(
    table: &MortalityTable,
    age: u32,
    n: u32,
    deferment: u32,
    sex: Sex,
    rate: f64,
    k: u32,
) -> f64 {
    if k == 0 || n == 0 || deferment == 0 || deferment > n || !table.ends_within(age, n) {
        return 0.0;
    }
    let v = discount_factor(rate);
    n_year_survival(table, age, deferment, sex)
        * v.powi(deferment as i32)
        * temporary_annuity_k(table, age + deferment, n - deferment, sex, rate, k)
}

/// Payment years of a temporary annuity after cutting at the ceiling; None if there are none
fn effective_term(table: &MortalityTable, age: u32, n: u32) -> Option<u32> {
    if n == 0 || !table.covers(age) || age >= table.max_age() {
        return None;
    }
    Some(n.min(table.max_age() - age))
}
