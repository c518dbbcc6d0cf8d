//! Discounted cost and utility accrual.
//!
//! Costs and utilities are modeled as constant per-year flows while a
//! patient dwells in a state, discounted continuously back to time zero.

use crate::{HealthState, Parameters};

/// Present value, at time 0, of a constant payment flow of `payment` per
/// year over `[t0, t1]` under continuous compounding at `discount_rate`.
///
/// For `r = 0` this is exactly `payment * (t1 - t0)`; otherwise
/// `payment * (e^{-r t0} - e^{-r t1}) / r`.
pub fn pv_continuous_payment(payment: f64, discount_rate: f64, t0: f64, t1: f64) -> f64 {
    if discount_rate == 0.0 {
        payment * (t1 - t0)
    } else {
        payment * ((-discount_rate * t0).exp() - (-discount_rate * t1).exp()) / discount_rate
    }
}

/// Running discounted totals for one patient.
///
/// `accrue` must be called exactly once per state-dwell interval, with the
/// state the patient occupied since the previous call; the accounting
/// boundary only moves forward.
#[derive(Clone, Debug)]
pub struct CostUtilityMonitor {
    t_last_recorded: f64,
    pub total_discounted_cost: f64,
    pub total_discounted_utility: f64,
}

impl Default for CostUtilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl CostUtilityMonitor {
    pub fn new() -> Self {
        Self {
            t_last_recorded: 0.0,
            total_discounted_cost: 0.0,
            total_discounted_utility: 0.0,
        }
    }

    /// Account for the dwell interval `[t_last_recorded, time]` spent in
    /// `state`, then advance the boundary to `time`.
    ///
    /// The therapy drug cost accrues only while the patient is alive; care
    /// costs and utilities use the per-state annual rates.
    pub fn accrue(&mut self, time: f64, state: HealthState, params: &Parameters) {
        debug_assert!(
            time >= self.t_last_recorded,
            "accrual boundary moved backwards: {} < {}",
            time,
            self.t_last_recorded
        );

        let treatment_cost = if state.is_death() {
            0.0
        } else {
            params.annual_treatment_cost
        };
        let cost_rate = params.annual_state_costs[state.index()] + treatment_cost;
        let utility_rate = params.annual_state_utilities[state.index()];

        self.total_discounted_cost += pv_continuous_payment(
            cost_rate,
            params.discount_rate,
            self.t_last_recorded,
            time,
        );
        self.total_discounted_utility += pv_continuous_payment(
            utility_rate,
            params.discount_rate,
            self.t_last_recorded,
            time,
        );

        self.t_last_recorded = time;
    }

    pub fn t_last_recorded(&self) -> f64 {
        self.t_last_recorded
    }
}
