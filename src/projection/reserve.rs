//! Net premium reserves over the contract term
//!
//! The net premium is fixed at issue by the equivalence principle:
//!
//! ```text
//! P = (A¹ₓ:ₙ + ₙEₓ) / äₓ:ₜ⁽ᵏ⁾
//! ```
//!
//! and the prospective reserve at offset m is
//!
//! ```text
//! V(m) = A¹ₓ₊ₘ:ₙ₋ₘ + ₙ₋ₘEₓ₊ₘ - P · äₓ₊ₘ:ₜ₋ₘ⁽ᵏ⁾
//! ```
//!
//! with the premium annuity zero once the premium term t has run out.

use serde::{Deserialize, Serialize};

use super::ProjectionEngine;
use crate::contract::Sex;

/// All series behind a reserve projection, each with n + 1 entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveProjection {
    /// Premium annuity, zero from offset t on
    pub premium_annuity: Vec<f64>,
    pub death_benefit: Vec<f64>,
    pub pure_endowment: Vec<f64>,

    /// Annual net premium rate per unit sum insured
    pub net_premium: f64,

    pub reserve: Vec<f64>,
}

impl ProjectionEngine {
    /// Reserve series V(0..=n) for an endowment of term n with premiums over t years
    ///
    /// Empty when n = 0, t = 0, t > n or the contract leaves the table.
    pub fn reserve(&self, age: u32, n: u32, t: u32, sex: Sex, rate: f64, k: u32) -> Vec<f64> {
        self.reserve_projection(age, n, t, sex, rate, k)
            .map(|projection| projection.reserve)
            .unwrap_or_default()
    }

    /// Reserve series together with the benefit and premium series it is built from
    pub fn reserve_projection(
        &self,
        age: u32,
        n: u32,
        t: u32,
        sex: Sex,
        rate: f64,
        k: u32,
    ) -> Option<ReserveProjection> {
        if t == 0 || t > n {
            log::warn!("premium term {} must lie in 1..={}, returning empty reserve", t, n);
            return None;
        }

        let death_benefit = self.death_benefit_series(age, n, sex, rate);
        let pure_endowment = self.pure_endowment_series(age, n, sex, rate);
        if death_benefit.is_empty() || pure_endowment.is_empty() {
            return None;
        }

        let mut premium_annuity = self.annuity_series(age, t, sex, rate, k);
        premium_annuity.resize(n as usize + 1, 0.0);

        let benefit_at_issue = death_benefit[0] + pure_endowment[0];
        let net_premium = if premium_annuity[0] > 0.0 {
            benefit_at_issue / premium_annuity[0]
        } else {
            0.0
        };

        let reserve = death_benefit
            .iter()
            .zip(&pure_endowment)
            .zip(&premium_annuity)
            .map(|((a, e), annuity)| a + e - net_premium * annuity)
            .collect();

        log::debug!(
            "reserve projection: age {} term {} premium term {} net premium {:.6}",
            age,
            n,
            t,
            net_premium
        );

        Some(ReserveProjection {
            premium_annuity,
            death_benefit,
            pure_endowment,
            net_premium,
            reserve,
        })
    }
}
