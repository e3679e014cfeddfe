//! Commutation columns and the present values derived from them
//!
//! Columns are computed eagerly for one (table, sex, rate) combination and
//! cover ages min..=ω:
//!
//! ```text
//! lₓ₊₁ = lₓ · (1 - qₓ)          l_min = 1,000,000
//! dₓ   = lₓ - lₓ₊₁              d_ω = 0
//! Dₓ   = lₓ · vˣ
//! Cₓ   = dₓ · vˣ⁺¹
//! Nₓ   = Σ_{j=x}^{ω-1} Dⱼ         N_ω = 0
//! Mₓ   = Σ_{j=x}^{ω-1} Cⱼ         M_ω = 0
//! Rₓ   = Σ_{j=x}^{ω-1} Mⱼ
//! ```
//!
//! For contracts ending before ω the results equal the direct recurrences.
#![allow(non_snake_case)]

use crate::contract::Sex;
use crate::finance::{annuity_certain, discount_factor, fractional_payment_adjustment};
use crate::tables::MortalityTable;

/// Radix l at the table's lowest age
pub const RADIX: f64 = 1_000_000.0;

/// Commutation columns for one sex and interest rate
#[derive(Debug, Clone)]
pub struct CommutationTable {
    min_age: u32,
    max_age: u32,
    sex: Sex,
    rate: f64,

    lx: Vec<f64>,
    dx: Vec<f64>,
    Dx: Vec<f64>,
    Cx: Vec<f64>,
    Nx: Vec<f64>,
    Mx: Vec<f64>,
    Rx: Vec<f64>,
}

impl CommutationTable {
    pub fn new(table: &MortalityTable, sex: Sex, rate: f64) -> Self {
        let min_age = table.min_age();
        let max_age = table.max_age();
        let len = (max_age - min_age + 1) as usize;
        let v = discount_factor(rate);

        let qx = table.death_probability_range(min_age, max_age - min_age, sex);

        let mut lx = Vec::with_capacity(len);
        lx.push(RADIX);
        for q in &qx {
            let last = lx[lx.len() - 1];
            lx.push(last * (1.0 - q));
        }

        let mut dx: Vec<f64> = lx.windows(2).map(|w| w[0] - w[1]).collect();
        dx.push(0.0);

        let Dx: Vec<f64> = lx
            .iter()
            .enumerate()
            .map(|(idx, l)| l * v.powi(min_age as i32 + idx as i32))
            .collect();
        let Cx: Vec<f64> = dx
            .iter()
            .enumerate()
            .map(|(idx, d)| d * v.powi(min_age as i32 + idx as i32 + 1))
            .collect();

        // Tail sums stop before ω
        let Nx = tail_sums(&Dx);
        let Mx = tail_sums(&Cx);
        let Rx = tail_sums(&Mx);

        log::debug!(
            "commutation columns for table '{}' sex {} rate {} (ages {}-{})",
            table.name(),
            sex,
            rate,
            min_age,
            max_age
        );

        Self {
            min_age,
            max_age,
            sex,
            rate,
            lx,
            dx,
            Dx,
            Cx,
            Nx,
            Mx,
            Rx,
        }
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    fn ends_within(&self, age: u32, n: u32) -> bool {
        age.checked_add(n).map_or(false, |end| end <= self.max_age)
    }

    pub fn lx(&self, age: u32) -> f64 {
        self.column(&self.lx, age)
    }

    pub fn dx(&self, age: u32) -> f64 {
        self.column(&self.dx, age)
    }

    pub fn Dx(&self, age: u32) -> f64 {
        self.column(&self.Dx, age)
    }

    pub fn Cx(&self, age: u32) -> f64 {
        self.column(&self.Cx, age)
    }

    pub fn Nx(&self, age: u32) -> f64 {
        self.column(&self.Nx, age)
    }

    pub fn Mx(&self, age: u32) -> f64 {
        self.column(&self.Mx, age)
    }

    pub fn Rx(&self, age: u32) -> f64 {
        self.column(&self.Rx, age)
    }

    /// äₓ⁽ᵏ⁾ = Nₓ / Dₓ - β(k, i)
    pub fn whole_life_annuity(&self, age: u32, k: u32) -> f64 {
        if k == 0 || age < self.min_age || age >= self.max_age {
            return 0.0;
        }
        let d = self.Dx(age);
        if d == 0.0 {
            return 0.0;
        }
        self.Nx(age) / d - fractional_payment_adjustment(k, self.rate)
    }

    /// äₓ:ₙ⁽ᵏ⁾ = (Nₓ - Nₓ₊ₙ) / Dₓ - β(k, i) · (1 - Dₓ₊ₙ / Dₓ)
    pub fn temporary_annuity(&self, age: u32, n: u32, k: u32) -> f64 {
        if k == 0 || n == 0 || age < self.min_age || !self.ends_within(age, n) {
            return 0.0;
        }
        let d = self.Dx(age);
        if d == 0.0 {
            return 0.0;
        }
        (self.Nx(age) - self.Nx(age + n)) / d
            - fractional_payment_adjustment(k, self.rate) * (1.0 - self.Dx(age + n) / d)
    }

    /// ₙ|äₓ⁽ᵏ⁾ = (Dₓ₊ₙ / Dₓ) · äₓ₊ₙ⁽ᵏ⁾
    pub fn deferred_annuity(&self, age: u32, deferment: u32, k: u32) -> f64 {
        if k == 0 || deferment == 0 || age < self.min_age || !self.ends_within(age, deferment) {
            return 0.0;
        }
        let d = self.Dx(age);
        if d == 0.0 {
            return 0.0;
        }
        self.Dx(age + deferment) / d * self.whole_life_annuity(age + deferment, k)
    }

    /// ₙAₓ¹ = (Mₓ - Mₓ₊ₙ) / Dₓ
    pub fn term_insurance(&self, age: u32, n: u32) -> f64 {
        if n == 0 || age < self.min_age || !self.ends_within(age, n) {
            return 0.0;
        }
        let d = self.Dx(age);
        if d == 0.0 {
            return 0.0;
        }
        (self.Mx(age) - self.Mx(age + n)) / d
    }

    /// ₙEₓ = Dₓ₊ₙ / Dₓ
    pub fn pure_endowment(&self, age: u32, n: u32) -> f64 {
        if n == 0 {
            return 1.0;
        }
        if age < self.min_age || !self.ends_within(age, n) {
            return 0.0;
        }
        let d = self.Dx(age);
        if d == 0.0 {
            return 0.0;
        }
        self.Dx(age + n) / d
    }

    /// Aₓ:ₙ = ₙAₓ¹ + ₙEₓ
    pub fn endowment(&self, age: u32, n: u32) -> f64 {
        self.term_insurance(age, n) + self.pure_endowment(age, n)
    }

    /// Annuity-certain at this table's rate
    pub fn annuity_certain(&self, g: u32, k: u32) -> f64 {
        annuity_certain(g, self.rate, k)
    }

    fn column(&self, values: &[f64], age: u32) -> f64 {
        if age < self.min_age {
            return 0.0;
        }
        values.get((age - self.min_age) as usize).copied().unwrap_or(0.0)
    }
}

/// tail[x] = Σ_{j=x}^{len-2} values[j]; the last entry is 0
fn tail_sums(values: &[f64]) -> Vec<f64> {
    let mut tail = vec![0.0; values.len()];
    for idx in (0..values.len().saturating_sub(1)).rev() {
        tail[idx] = tail[idx + 1] + values[idx];
    }
    tail
}
