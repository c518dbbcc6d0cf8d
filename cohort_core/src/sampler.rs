//! Continuous-time transition sampling (Gillespie stepping).
//!
//! One step of the stochastic simulation algorithm: draw an exponential
//! holding time at the current state's total exit rate, then pick the
//! destination with probability proportional to each outgoing rate. Both
//! draws come from the caller's random stream in a fixed order, so a patient
//! reseeded with the same value replays the identical trajectory.

use crate::{RateMatrix, Result};
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// One sampled event: how long the chain stays put, and where it goes next
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub holding_time: f64,
    pub next_state: usize,
}

struct StateRow {
    rates: Vec<f64>,
    total: f64,
    /// Holding-time distribution; `None` marks an absorbing state
    holding: Option<Exp<f64>>,
    /// Fallback destination when the cumulative scan exhausts the row
    /// (floating-point edge at the top of the cumulative sum)
    last_exit: usize,
}

/// Sampler over a validated rate matrix.
///
/// Construction precomputes per-state totals and exponential distributions
/// and is the fail-fast point for any row the matrix validation could not
/// reject. The sampler itself is immutable and shared read-only across all
/// patients of a cohort; randomness is supplied per call.
pub struct Gillespie {
    states: Vec<StateRow>,
}

impl Gillespie {
    pub fn new(matrix: &RateMatrix) -> Result<Self> {
        let mut states = Vec::with_capacity(matrix.size());

        for i in 0..matrix.size() {
            let rates = matrix.row(i).to_vec();
            let total = matrix.total_rate(i);

            let holding = if total > 0.0 {
                let exp = Exp::new(total).map_err(|e| {
                    crate::Error::Matrix(format!(
                        "state {} has an unusable total exit rate {}: {}",
                        i, total, e
                    ))
                })?;
                Some(exp)
            } else {
                None
            };

            let last_exit = rates.iter().rposition(|&r| r > 0.0).unwrap_or(0);
            states.push(StateRow {
                rates,
                total,
                holding,
                last_exit,
            });
        }

        Ok(Self { states })
    }

    /// Sample the next event out of `state`, or `None` if `state` is
    /// absorbing (the patient's trajectory has ended).
    pub fn next_event(&self, state: usize, rng: &mut impl Rng) -> Option<Transition> {
        let row = &self.states[state];
        let holding = row.holding.as_ref()?;

        let holding_time = holding.sample(rng);

        // Categorical draw weighted by rate: a single uniform over the
        // cumulative rates of the row.
        let mut remaining = rng.gen::<f64>() * row.total;
        let mut next_state = row.last_exit;
        for (j, &rate) in row.rates.iter().enumerate() {
            if rate <= 0.0 {
                continue;
            }
            if remaining < rate {
                next_state = j;
                break;
            }
            remaining -= rate;
        }

        Some(Transition {
            holding_time,
            next_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{trans_prob_matrix, trans_rate_matrix, HealthState, RateMatrix, Scenario};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mono_matrix() -> RateMatrix {
        let scenario = Scenario::default();
        let probs = trans_prob_matrix(&scenario.transitions.counts).unwrap();
        trans_rate_matrix(&probs, scenario.transitions.annual_background_mortality_prob).unwrap()
    }

    /// Chain-shaped matrix: each living state exits to exactly one successor
    fn chain_matrix() -> RateMatrix {
        let n = HealthState::COUNT;
        let mut rows = vec![vec![0.0; n]; n];
        rows[0][1] = 5.0;
        rows[1][2] = 5.0;
        rows[2][3] = 5.0;
        RateMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_death_states_are_absorbing() {
        let sampler = Gillespie::new(&mono_matrix()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(sampler
            .next_event(HealthState::HivDeath.index(), &mut rng)
            .is_none());
        assert!(sampler
            .next_event(HealthState::NaturalDeath.index(), &mut rng)
            .is_none());
    }

    #[test]
    fn test_single_exit_row_always_picks_it() {
        let sampler = Gillespie::new(&chain_matrix()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..50 {
            let event = sampler.next_event(0, &mut rng).unwrap();
            assert_eq!(event.next_state, 1);
            assert!(event.holding_time > 0.0);
        }
    }

    #[test]
    fn test_destination_has_positive_rate() {
        let matrix = mono_matrix();
        let sampler = Gillespie::new(&matrix).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for state in &HealthState::ALL[..HealthState::COUNT - 2] {
            for _ in 0..200 {
                let event = sampler.next_event(state.index(), &mut rng).unwrap();
                assert!(
                    matrix.get(state.index(), event.next_state) > 0.0,
                    "sampled zero-rate transition {} -> {}",
                    state.index(),
                    event.next_state
                );
            }
        }
    }

    #[test]
    fn test_same_seed_replays_same_sequence() {
        let sampler = Gillespie::new(&mono_matrix()).unwrap();

        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        for _ in 0..20 {
            let ea = sampler.next_event(0, &mut a).unwrap();
            let eb = sampler.next_event(0, &mut b).unwrap();
            assert_eq!(ea, eb);
        }
    }
}
