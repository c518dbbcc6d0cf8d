//! Single-patient trajectory simulation.
//!
//! Drives one patient from the initial state through repeated Gillespie
//! steps until an absorbing state or the simulation horizon is reached,
//! accruing discounted cost/utility per dwell interval and recording
//! survival time and AIDS onset.

use crate::{CostUtilityMonitor, Gillespie, HealthState, Parameters, PatientOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// One simulation unit: a private random stream keyed by the patient id,
/// the current health state, and the monitored outcomes.
pub struct Patient {
    pub id: u64,
    rng: StdRng,
    current_state: HealthState,
    survival_time: Option<f64>,
    time_to_aids: Option<f64>,
    econ: CostUtilityMonitor,
}

impl Patient {
    /// Create a patient. The id doubles as the random seed, so identically
    /// parameterized cohorts replay identically.
    pub fn new(id: u64, params: &Parameters) -> Self {
        Self {
            id,
            rng: StdRng::seed_from_u64(id),
            current_state: params.initial_state,
            survival_time: None,
            time_to_aids: None,
            econ: CostUtilityMonitor::new(),
        }
    }

    /// Simulate this patient up to `horizon` years.
    ///
    /// Every dwell interval is accounted exactly once: at each transition
    /// for the state just left, and at the end for the final state held
    /// through the horizon. An absorbing state keeps accruing its own
    /// reward rates until the horizon (zero for the death states in the
    /// shipped scenario).
    pub fn simulate(&mut self, params: &Parameters, sampler: &Gillespie, horizon: f64) {
        let mut t = 0.0;

        loop {
            let event = match sampler.next_event(self.current_state.index(), &mut self.rng) {
                Some(event) => event,
                None => {
                    // Absorbed: hold the terminal state to the horizon
                    self.econ.accrue(horizon, self.current_state, params);
                    break;
                }
            };

            if t + event.holding_time > horizon {
                // Next transition falls beyond the horizon: censor here
                self.econ.accrue(horizon, self.current_state, params);
                break;
            }

            t += event.holding_time;
            self.econ.accrue(t, self.current_state, params);

            let new_state = HealthState::from_index(event.next_state)
                .expect("sampler indices bounded by the rate matrix size");

            if new_state.is_death() {
                self.survival_time = Some(t);
            }
            if new_state == HealthState::Aids && self.time_to_aids.is_none() {
                self.time_to_aids = Some(t);
            }

            self.current_state = new_state;
        }
    }

    /// Extract the final outcome record
    pub fn outcome(&self) -> PatientOutcome {
        PatientOutcome {
            patient_id: self.id,
            survival_time: self.survival_time,
            time_to_aids: self.time_to_aids,
            developed_aids: self.time_to_aids.is_some(),
            discounted_cost: self.econ.total_discounted_cost,
            discounted_utility: self.econ.total_discounted_utility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RateMatrix, Scenario, Therapy};

    fn base_params() -> Parameters {
        Parameters::from_scenario(&Scenario::default(), Therapy::Mono).unwrap()
    }

    /// Matrix where AIDS exits to HIV death at an enormous rate, so the
    /// holding time is bounded below 1e-6 for every possible uniform draw.
    fn immediate_death_matrix() -> RateMatrix {
        let n = HealthState::COUNT;
        let mut rows = vec![vec![0.0; n]; n];
        rows[0][1] = 1.0;
        rows[1][2] = 1.0;
        rows[2][3] = 1e9;
        RateMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_death_before_horizon_records_survival_time() {
        let mut params = base_params();
        params.rate_matrix = immediate_death_matrix();
        params.initial_state = HealthState::Aids;
        let sampler = Gillespie::new(&params.rate_matrix).unwrap();

        let mut patient = Patient::new(3, &params);
        patient.simulate(&params, &sampler, 10.0);
        let outcome = patient.outcome();

        let survival = outcome.survival_time.expect("patient must die");
        assert!(survival < 1e-6);
        // The patient started in AIDS and never entered it by transition
        assert!(!outcome.developed_aids);
        assert_eq!(outcome.time_to_aids, None);
    }

    #[test]
    fn test_absorbing_start_is_censored_with_flat_accrual() {
        // A patient whose initial state is absorbing never transitions:
        // survival stays unset and, at zero discount, totals are exactly
        // rate * horizon for the held state.
        let mut params = base_params();
        params.initial_state = HealthState::NaturalDeath;
        params.discount_rate = 0.0;
        params.annual_state_costs[HealthState::NaturalDeath.index()] = 120.0;
        params.annual_state_utilities[HealthState::NaturalDeath.index()] = 0.4;
        let sampler = Gillespie::new(&params.rate_matrix).unwrap();

        let mut patient = Patient::new(11, &params);
        patient.simulate(&params, &sampler, 10.0);
        let outcome = patient.outcome();

        assert_eq!(outcome.survival_time, None);
        assert_eq!(outcome.time_to_aids, None);
        assert_eq!(outcome.discounted_cost, 120.0 * 10.0);
        assert_eq!(outcome.discounted_utility, 0.4 * 10.0);
    }

    #[test]
    fn test_horizon_censoring_with_negligible_rates() {
        // Exit rates of 1e-300 put every representable holding time far
        // beyond the horizon: the patient is censored without transitioning.
        let n = HealthState::COUNT;
        let mut rows = vec![vec![0.0; n]; n];
        rows[0][1] = 1e-300;
        rows[1][2] = 1e-300;
        rows[2][3] = 1e-300;

        let mut params = base_params();
        params.rate_matrix = RateMatrix::from_rows(rows).unwrap();
        params.discount_rate = 0.0;
        let sampler = Gillespie::new(&params.rate_matrix).unwrap();

        let mut patient = Patient::new(42, &params);
        patient.simulate(&params, &sampler, 25.0);
        let outcome = patient.outcome();

        assert_eq!(outcome.survival_time, None);
        assert!(!outcome.developed_aids);
        // Full horizon spent in the initial state on mono therapy
        assert_eq!(outcome.discounted_cost, (2756.0 + 2278.0) * 25.0);
        assert_eq!(outcome.discounted_utility, 0.75 * 25.0);
    }

    #[test]
    fn test_aids_onset_recorded_on_first_entry() {
        // Chain with huge rates: CD4 200-500 -> CD4 <200 -> AIDS -> HIV death
        // completes almost immediately, passing through AIDS exactly once.
        let n = HealthState::COUNT;
        let mut rows = vec![vec![0.0; n]; n];
        rows[0][1] = 1e9;
        rows[1][2] = 1e9;
        rows[2][3] = 1e9;

        let mut params = base_params();
        params.rate_matrix = RateMatrix::from_rows(rows).unwrap();
        let sampler = Gillespie::new(&params.rate_matrix).unwrap();

        let mut patient = Patient::new(5, &params);
        patient.simulate(&params, &sampler, 10.0);
        let outcome = patient.outcome();

        assert!(outcome.developed_aids);
        let aids_at = outcome.time_to_aids.unwrap();
        let died_at = outcome.survival_time.unwrap();
        assert!(aids_at <= died_at);
        assert!(died_at < 1e-6);
    }

    #[test]
    fn test_same_id_replays_identically() {
        let params = base_params();
        let sampler = Gillespie::new(&params.rate_matrix).unwrap();

        let mut a = Patient::new(123, &params);
        let mut b = Patient::new(123, &params);
        a.simulate(&params, &sampler, 50.0);
        b.simulate(&params, &sampler, 50.0);

        let oa = a.outcome();
        let ob = b.outcome();
        assert_eq!(oa.survival_time, ob.survival_time);
        assert_eq!(oa.time_to_aids, ob.time_to_aids);
        assert_eq!(oa.discounted_cost, ob.discounted_cost);
        assert_eq!(oa.discounted_utility, ob.discounted_utility);
    }
}
