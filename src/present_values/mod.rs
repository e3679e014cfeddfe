//! Present values of life-contingent payments
//!
//! Two evaluation paths give the same numbers for contracts that end inside
//! the table:
//! - direct recurrences over survival products (`annuities`, `benefits`)
//! - commutation columns computed once per (sex, rate) (`commutation`, `cache`)

mod annuities;
mod benefits;
pub mod cache;
pub mod commutation;

pub(crate) use annuities::discounted_sum;
pub(crate) use benefits::discounted_deaths;
pub use annuities::{
    deferred_temporary_annuity, deferred_whole_life_annuity, temporary_annuity,
    temporary_annuity_k, whole_life_annuity, whole_life_annuity_k,
};
pub use benefits::{endowment, pure_endowment, term_insurance};
pub use cache::CommutationCache;
pub use commutation::CommutationTable;
