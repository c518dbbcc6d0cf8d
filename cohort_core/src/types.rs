//! Core domain types for the Prognos cohort simulator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Health states and their fixed ordering
//! - Therapy selection
//! - Per-patient outcome records

use serde::{Deserialize, Serialize};

// ============================================================================
// Health States
// ============================================================================

/// Health states of the disease-progression model.
///
/// The ordering of this enumeration is a hard contract, not a convenience:
/// patients only progress forward through disease severity (index strictly
/// increases on every HIV transition), and the combination-therapy rate
/// adjustment scales exactly the upper-triangular entries of the rate matrix.
/// Reordering variants silently changes which transitions are treated as
/// disease progression. `HivDeath` and `NaturalDeath` are absorbing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// CD4 count between 200 and 500 cells/mL
    Cd4Between200And500,
    /// CD4 count below 200 cells/mL
    Cd4Below200,
    /// AIDS
    Aids,
    /// Death attributable to HIV
    HivDeath,
    /// Death from background (all-cause) mortality
    NaturalDeath,
}

impl HealthState {
    /// Number of health states
    pub const COUNT: usize = 5;

    /// All states, in model order
    pub const ALL: [HealthState; Self::COUNT] = [
        HealthState::Cd4Between200And500,
        HealthState::Cd4Below200,
        HealthState::Aids,
        HealthState::HivDeath,
        HealthState::NaturalDeath,
    ];

    /// Row/column index of this state in transition matrices
    pub fn index(self) -> usize {
        self as usize
    }

    /// State for a matrix index, if the index is in range
    pub fn from_index(index: usize) -> Option<HealthState> {
        Self::ALL.get(index).copied()
    }

    /// Whether this state represents death (absorbing)
    pub fn is_death(self) -> bool {
        matches!(self, HealthState::HivDeath | HealthState::NaturalDeath)
    }
}

// ============================================================================
// Therapy
// ============================================================================

/// Therapy arm simulated for a cohort
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Therapy {
    /// Zidovudine only
    Mono,
    /// Zidovudine + lamivudine
    Combo,
}

impl Therapy {
    pub fn label(self) -> &'static str {
        match self {
            Therapy::Mono => "mono therapy",
            Therapy::Combo => "combination therapy",
        }
    }
}

// ============================================================================
// Patient Outcomes
// ============================================================================

/// Final outcome record of one simulated patient.
///
/// `survival_time` is absent when the patient was still alive at the
/// simulation horizon (right-censored); `time_to_aids` is recorded once,
/// on first entry into the AIDS state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientOutcome {
    pub patient_id: u64,
    pub survival_time: Option<f64>,
    pub time_to_aids: Option<f64>,
    pub developed_aids: bool,
    pub discounted_cost: f64,
    pub discounted_utility: f64,
}
