//! Survival and death probabilities over several years
//!
//! Everything here is a running product over one-year survival rates
//! fetched from the table in a single range query.

use crate::contract::Sex;
use crate::tables::MortalityTable;

/// n-year survival probability ₙpₓ = pₓ · pₓ₊₁ · … · pₓ₊ₙ₋₁
///
/// Returns 1.0 for n = 0 and, by convention, whenever `age + n` reaches the
/// table's highest age: no risk is representable beyond the table.
pub fn n_year_survival(table: &MortalityTable, age: u32, n: u32, sex: Sex) -> f64 {
    if n == 0 || !table.ends_before_ceiling(age, n) {
        return 1.0;
    }
    table.survival_probability_range(age, n, sex).iter().product()
}

/// Probability of dying in year n: ₙ₋₁pₓ · qₓ₊ₙ₋₁
///
/// Returns 0.0 for n = 0 and whenever `age + n` reaches the table's highest age.
pub fn n_year_death(table: &MortalityTable, age: u32, n: u32, sex: Sex) -> f64 {
    if n == 0 || !table.ends_before_ceiling(age, n) {
        return 0.0;
    }
    match table.death_probability(age + n - 1, sex) {
        Ok(q) => n_year_survival(table, age, n - 1, sex) * q,
        Err(_) => 0.0,
    }
}

/// Cumulative survival vector: index t holds ₜpₓ for t = 0..=max_t, with ₀pₓ = 1
///
/// The vector is cut at the table's highest age, so it holds at most
/// `max_age - age + 1` entries. An age outside the table yields `[1.0]`.
pub fn survival_matrix(table: &MortalityTable, age: u32, max_t: u32, sex: Sex) -> Vec<f64> {
    if !table.covers(age) {
        return vec![1.0];
    }

    let horizon = max_t.min(table.max_age() - age);
    let px = table.survival_probability_range(age, horizon, sex);

    let mut tpx = Vec::with_capacity(px.len() + 1);
    tpx.push(1.0);
    let mut running = 1.0;
    for p in px {
        running *= p;
        tpx.push(running);
    }
    tpx
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> MortalityTable {
        MortalityTable::iam_2012_basic()
    }

    #[test]
    fn test_zero_years() {
        let table = table();
        assert_eq!(n_year_survival(&table, 40, 0, Sex::Male), 1.0);
        assert_eq!(n_year_death(&table, 40, 0, Sex::Male), 0.0);
    }

    #[test]
    fn test_one_year() {
        let table = table();
        let q = table.death_probability(40, Sex::Male).unwrap();
        assert_relative_eq!(n_year_survival(&table, 40, 1, Sex::Male), 1.0 - q, epsilon = 1e-15);
        assert_relative_eq!(n_year_death(&table, 40, 1, Sex::Male), q, epsilon = 1e-15);
    }

    #[test]
    fn test_boundary_convention() {
        let table = table();
        let omega = table.max_age();
        assert_eq!(n_year_survival(&table, omega - 5, 5, Sex::Female), 1.0);
        assert_eq!(n_year_survival(&table, omega - 5, 10, Sex::Female), 1.0);
        assert_eq!(n_year_death(&table, omega - 5, 5, Sex::Female), 0.0);
        assert!(n_year_survival(&table, omega - 5, 4, Sex::Female) < 1.0);
    }

    #[test]
    fn test_horizon_near_u32_max() {
        let table = table();
        assert_eq!(n_year_survival(&table, 40, u32::MAX, Sex::Male), 1.0);
        assert_eq!(n_year_survival(&table, u32::MAX, 1, Sex::Female), 1.0);
        assert_eq!(n_year_death(&table, 40, u32::MAX, Sex::Male), 0.0);
        assert_eq!(n_year_death(&table, u32::MAX, 1, Sex::Female), 0.0);
        assert_eq!(survival_matrix(&table, u32::MAX, u32::MAX, Sex::Male), vec![1.0]);
        assert_eq!(survival_matrix(&table, 40, u32::MAX, Sex::Male).len(), 82);
    }

    #[test]
    fn test_telescoping() {
        let table = table();
        for sex in [Sex::Male, Sex::Female] {
            for age in [0, 25, 40, 65, 90] {
                for n1 in [1, 5, 10] {
                    for n2 in [1, 7, 15] {
                        if age + n1 + n2 >= table.max_age() {
                            continue;
                        }
                        let whole = n_year_survival(&table, age, n1 + n2, sex);
                        let split = n_year_survival(&table, age, n1, sex)
                            * n_year_survival(&table, age + n1, n2, sex);
                        assert_relative_eq!(whole, split, max_relative = 1e-10);
                    }
                }
            }
        }
    }

    #[test]
    fn test_death_probability_bounds() {
        let table = table();
        for sex in [Sex::Male, Sex::Female] {
            for n in 1..60 {
                let q = n_year_death(&table, 50, n, sex);
                assert!((0.0..=1.0).contains(&q));
            }
        }
    }

    #[test]
    fn test_survival_matrix_every_age_and_horizon() {
        let table = table();
        let omega = table.max_age();
        for sex in [Sex::Male, Sex::Female] {
            for age in table.min_age()..=omega {
                // Reference products built from point lookups only
                let mut expected = vec![1.0];
                for s in age..omega {
                    let q = table.death_probability(s, sex).unwrap();
                    let last = *expected.last().unwrap();
                    expected.push(last * (1.0 - q));
                }

                for max_t in 0..=omega - age + 2 {
                    let tpx = survival_matrix(&table, age, max_t, sex);
                    let horizon = max_t.min(omega - age) as usize;
                    assert_eq!(tpx.len(), horizon + 1, "age {} max_t {}", age, max_t);
                    assert_eq!(tpx[0], 1.0);
                    for (t, &value) in tpx.iter().enumerate() {
                        assert_relative_eq!(value, expected[t], max_relative = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_survival_matrix_non_increasing() {
        let table = table();
        for sex in [Sex::Male, Sex::Female] {
            let tpx = survival_matrix(&table, 30, 200, sex);
            assert!(tpx.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn test_survival_matrix_truncated_at_ceiling() {
        let table = table();
        let omega = table.max_age();

        let tpx = survival_matrix(&table, omega - 3, 10, Sex::Male);
        assert_eq!(tpx.len(), 4);

        assert_eq!(survival_matrix(&table, omega, 10, Sex::Male), vec![1.0]);
        assert_eq!(survival_matrix(&table, omega + 1, 10, Sex::Male), vec![1.0]);
        assert_eq!(survival_matrix(&table, 40, 0, Sex::Male), vec![1.0]);
    }
}
