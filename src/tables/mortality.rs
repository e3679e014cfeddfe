//! Mortality tables: one-year death probabilities by integer age and sex
//!
//! A table is built once (from the built-in rates or a table file) and is
//! immutable afterwards. It is `Send + Sync`, so a single instance behind an
//! `Arc` can serve any number of concurrent valuations.
//!
//! Two query conventions are deliberate:
//! - point queries (`death_probability`) fail with `OutOfRange`
//! - range queries return an empty vector when the range leaves the table,
//!   and callers must read that as "no data", never as zero mortality

use crate::contract::Sex;
use crate::error::{ActuarialError, Result};

/// Age ceiling: rows above this age are dropped when a table is built
pub const MAX_AGE: u32 = 121;

/// Mortality table keyed by contiguous integer ages
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityTable {
    /// Table identifier (e.g. "DAV1994T")
    name: String,

    /// Lowest age in the table
    min_age: u32,

    /// Annual death probabilities indexed by `age - min_age`
    /// Stored as (male_rate, female_rate)
    rates: Vec<(f64, f64)>,
}

impl MortalityTable {
    /// Build a table from contiguous rates starting at `min_age`
    ///
    /// Rows above `MAX_AGE` are dropped. Every probability must lie in [0, 1].
    pub fn new(name: impl Into<String>, min_age: u32, mut rates: Vec<(f64, f64)>) -> Result<Self> {
        let name = name.into();

        if min_age > MAX_AGE {
            return Err(ActuarialError::InvalidTable(format!(
                "table '{}' starts at age {} above the ceiling {}",
                name, min_age, MAX_AGE
            )));
        }

        let max_rows = (MAX_AGE - min_age + 1) as usize;
        if rates.len() > max_rows {
            log::info!(
                "table '{}': keeping {} of {} rows (ages {}-{})",
                name,
                max_rows,
                rates.len(),
                min_age,
                MAX_AGE
            );
            rates.truncate(max_rows);
        }

        if rates.is_empty() {
            return Err(ActuarialError::InvalidTable(format!("table '{}' has no rows", name)));
        }

        for (idx, &(male, female)) in rates.iter().enumerate() {
            for q in [male, female] {
                if !q.is_finite() || !(0.0..=1.0).contains(&q) {
                    return Err(ActuarialError::InvalidTable(format!(
                        "table '{}': probability {} at age {} outside [0, 1]",
                        name,
                        q,
                        min_age + idx as u32
                    )));
                }
            }
        }

        Ok(Self { name, min_age, rates })
    }

    /// Build a table from `(age, male, female)` rows in any order
    ///
    /// Ages must be unique and contiguous once rows above `MAX_AGE` are removed.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<(u32, f64, f64)>) -> Result<Self> {
        let name = name.into();
        rows.retain(|&(age, _, _)| age <= MAX_AGE);
        rows.sort_by_key(|&(age, _, _)| age);

        let min_age = match rows.first() {
            Some(&(age, _, _)) => age,
            None => {
                return Err(ActuarialError::InvalidTable(format!("table '{}' has no rows", name)))
            }
        };

        for (idx, &(age, _, _)) in rows.iter().enumerate() {
            let expected = min_age + idx as u32;
            if age != expected {
                return Err(ActuarialError::InvalidTable(format!(
                    "table '{}': expected age {} but found {} (ages must be unique and contiguous)",
                    name, expected, age
                )));
            }
        }

        let rates = rows.into_iter().map(|(_, male, female)| (male, female)).collect();
        Self::new(name, min_age, rates)
    }

    /// IAM 2012 Basic table, ages 0-120, closed with a terminal row at age 121 (q = 1)
    pub fn iam_2012_basic() -> Self {
        let mut rates = Self::iam_2012_base_rates();
        rates.push((1.0, 1.0));
        Self {
            name: "IAM2012Basic".to_string(),
            min_age: 0,
            rates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    /// Highest age in the table; this is the ceiling ω for all present values
    pub fn max_age(&self) -> u32 {
        self.min_age + self.rates.len() as u32 - 1
    }

    /// Whether `age` has a row in this table
    pub fn covers(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age()
    }

    /// Whether `age + n` stays at or below ω; false if the sum overflows
    pub fn ends_within(&self, age: u32, n: u32) -> bool {
        age.checked_add(n).map_or(false, |end| end <= self.max_age())
    }

    /// Whether `age + n` stays strictly below ω; false if the sum overflows
    pub fn ends_before_ceiling(&self, age: u32, n: u32) -> bool {
        age.checked_add(n).map_or(false, |end| end < self.max_age())
    }

    /// One-year death probability q for the given age and sex
    pub fn death_probability(&self, age: u32, sex: Sex) -> Result<f64> {
        if !self.covers(age) {
            return Err(ActuarialError::OutOfRange {
                table: self.name.clone(),
                age,
                min_age: self.min_age,
                max_age: self.max_age(),
            });
        }
        Ok(self.rate_at((age - self.min_age) as usize, sex))
    }

    /// Death probabilities for ages `age, age+1, ..., age+n-1`
    ///
    /// Empty if `n == 0`, if `age` is below the table, or if `age + n`
    /// exceeds the table's highest age.
    pub fn death_probability_range(&self, age: u32, n: u32, sex: Sex) -> Vec<f64> {
        if n == 0 || age < self.min_age || !self.ends_within(age, n) {
            return Vec::new();
        }
        let start = (age - self.min_age) as usize;
        (start..start + n as usize)
            .map(|idx| self.rate_at(idx, sex))
            .collect()
    }

    /// One-year survival probabilities p = 1 - q for the same ages as `death_probability_range`
    pub fn survival_probability_range(&self, age: u32, n: u32, sex: Sex) -> Vec<f64> {
        self.death_probability_range(age, n, sex)
            .into_iter()
            .map(|q| 1.0 - q)
            .collect()
    }

    fn rate_at(&self, idx: usize, sex: Sex) -> f64 {
        let (male, female) = self.rates[idx];
        match sex {
            Sex::Male => male,
            Sex::Female => female,
        }
    }

    /// IAM 2012 Basic mortality rates, (male, female) by age 0-120
    fn iam_2012_base_rates() -> Vec<(f64, f64)> {
        vec![
            // Ages 0-9
            (0.001783, 0.001801), (0.000446, 0.00045), (0.000306, 0.000287),
            (0.000254, 0.000199), (0.000193, 0.000152), (0.000186, 0.000139),
            (0.000184, 0.00013), (0.000177, 0.000122), (0.000159, 0.000105),
            (0.000143, 0.000098),
            // Ages 10-19
            (0.000126, 0.000094), (0.000123, 0.000096), (0.000147, 0.000105),
            (0.000188, 0.00012), (0.000236, 0.000146), (0.000282, 0.000174),
            (0.000325, 0.000199), (0.000364, 0.00022), (0.000399, 0.000234),
            (0.00043, 0.000245),
            // Ages 20-29
            (0.000459, 0.000253), (0.000492, 0.00026), (0.000526, 0.000266),
            (0.000569, 0.000272), (0.000616, 0.000275), (0.000669, 0.000277),
            (0.000728, 0.000284), (0.000764, 0.00029), (0.000789, 0.0003),
            (0.000808, 0.000313),
            // Ages 30-39
            (0.000824, 0.000333), (0.000834, 0.000357), (0.000838, 0.000375),
            (0.000828, 0.00039), (0.000808, 0.000405), (0.000789, 0.000424),
            (0.000783, 0.000447), (0.0008, 0.000476), (0.000837, 0.000514),
            (0.000889, 0.00056),
            // Ages 40-49
            (0.000955, 0.000613), (0.001029, 0.000667), (0.00111, 0.000723),
            (0.001188, 0.000774), (0.001268, 0.000823), (0.001355, 0.000866),
            (0.001464, 0.000917), (0.001615, 0.000983), (0.001808, 0.001072),
            (0.002032, 0.001168),
            // Ages 50-59
            (0.002285, 0.00129), (0.002557, 0.001453), (0.002828, 0.001622),
            (0.003088, 0.001792), (0.003345, 0.001972), (0.003616, 0.002166),
            (0.003922, 0.002393), (0.004272, 0.002666), (0.004681, 0.003),
            (0.005146, 0.003393),
            // Ages 60-69
            (0.005662, 0.003844), (0.006237, 0.004352), (0.006854, 0.004899),
            (0.00751, 0.005482), (0.00822, 0.006118), (0.009007, 0.006829),
            (0.009497, 0.007279), (0.010085, 0.007821), (0.010787, 0.008475),
            (0.011625, 0.009234),
            // Ages 70-79
            (0.012619, 0.010083), (0.013798, 0.011011), (0.015195, 0.01203),
            (0.016834, 0.013154), (0.018733, 0.014415), (0.020905, 0.015869),
            (0.023367, 0.017555), (0.026155, 0.0195), (0.029306, 0.021758),
            (0.032858, 0.024412),
            // Ages 80-89
            (0.036927, 0.027579), (0.041703, 0.031501), (0.046957, 0.036122),
            (0.052713, 0.041477), (0.059148, 0.047589), (0.066505, 0.054441),
            (0.075015, 0.061972), (0.084823, 0.070155), (0.095987, 0.078963),
            (0.108482, 0.088336),
            // Ages 90-99
            (0.122214, 0.098197), (0.136799, 0.108323), (0.152409, 0.119188),
            (0.169078, 0.131334), (0.186882, 0.145521), (0.205844, 0.162722),
            (0.219247, 0.18212), (0.238612, 0.199661), (0.258341, 0.217946),
            (0.278219, 0.236834),
            // Ages 100-109
            (0.298452, 0.256357), (0.32361, 0.283802), (0.344191, 0.304716),
            (0.364633, 0.325819), (0.384783, 0.346936), (0.4, 0.367898),
            (0.4, 0.387607), (0.4, 0.4), (0.4, 0.4),
            (0.4, 0.4),
            // Ages 110-120
            (0.4, 0.4), (0.4, 0.4), (0.4, 0.4),
            (0.4, 0.4), (0.4, 0.4), (0.4, 0.4),
            (0.4, 0.4), (0.4, 0.4), (0.4, 0.4),
            (0.4, 0.4), (0.4, 0.4),
        ]
    }
}
