#![forbid(unsafe_code)]

//! Core domain model and simulation engine for the Prognos cohort simulator.
//!
//! This crate provides:
//! - Domain types (health states, therapies, patient outcomes)
//! - Scenario input data and immutable run parameters
//! - Rate matrix construction (discrete counts to continuous-time rates)
//! - Gillespie-style continuous-time transition sampling
//! - Discounted cost/utility accrual
//! - Patient and cohort simulation with survival-curve aggregation
//! - CSV/JSON export of cohort outcomes

pub mod types;
pub mod error;
pub mod scenario;
pub mod params;
pub mod rates;
pub mod sampler;
pub mod econ;
pub mod patient;
pub mod cohort;
pub mod stats;
pub mod export;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use scenario::{default_scenario, Scenario};
pub use params::Parameters;
pub use rates::{trans_prob_matrix, trans_rate_matrix, trans_rate_matrix_combo, RateMatrix};
pub use sampler::{Gillespie, Transition};
pub use econ::{pv_continuous_payment, CostUtilityMonitor};
pub use patient::Patient;
pub use cohort::{Cohort, CohortOutcomes, SurvivalPoint};
pub use stats::SummaryStat;
pub use export::{write_outcomes_csv, write_report_json, write_survival_curve_csv, RunReport};
