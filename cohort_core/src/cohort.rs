//! Cohort simulation and outcome aggregation.
//!
//! A cohort instantiates `pop_size` patients with distinct deterministic
//! seeds, simulates each independently against the shared parameters, and
//! aggregates the per-patient records into outcome collections, summary
//! statistics, and a population survival curve.

use crate::{
    Error, Gillespie, Parameters, Patient, PatientOutcome, Result, SummaryStat,
};
use serde::{Deserialize, Serialize};

/// One point of the population survival curve: how many patients are still
/// alive from `time` onwards (until the next point).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPoint {
    pub time: f64,
    pub alive: usize,
}

/// A cohort to simulate: identity and size. Parameters are supplied at
/// simulation time and shared read-only across all patients.
#[derive(Clone, Copy, Debug)]
pub struct Cohort {
    pub id: u64,
    pub pop_size: usize,
}

/// Aggregated outcomes of a simulated cohort
#[derive(Clone, Debug)]
pub struct CohortOutcomes {
    /// Per-patient records, in patient order
    pub outcomes: Vec<PatientOutcome>,

    /// Survival times of patients who died within the horizon
    /// (right-censored: survivors are omitted)
    pub survival_times: Vec<f64>,
    /// AIDS onset times of patients who developed AIDS
    pub times_to_aids: Vec<f64>,
    /// Discounted cost of every patient
    pub costs: Vec<f64>,
    /// Discounted utility of every patient
    pub utilities: Vec<f64>,

    /// Number of living patients over time, non-increasing
    pub survival_curve: Vec<SurvivalPoint>,

    pub stat_survival_time: SummaryStat,
    pub stat_time_to_aids: SummaryStat,
    pub stat_cost: SummaryStat,
    pub stat_utility: SummaryStat,
}

impl Cohort {
    pub fn new(id: u64, pop_size: usize) -> Self {
        Self { id, pop_size }
    }

    /// Simulate the whole cohort to `horizon` years.
    ///
    /// Patient `i` is seeded with `cohort_id * pop_size + i`, so a cohort is
    /// reproducible from its id, size, and parameters alone. Patients are
    /// discarded once their outcomes are extracted.
    pub fn simulate(&self, params: &Parameters, horizon: f64) -> Result<CohortOutcomes> {
        if self.pop_size == 0 {
            return Err(Error::Scenario("population size must be positive".into()));
        }
        if !(horizon > 0.0) || !horizon.is_finite() {
            return Err(Error::Scenario(format!(
                "simulation horizon must be positive and finite, got {}",
                horizon
            )));
        }

        let sampler = Gillespie::new(&params.rate_matrix)?;

        tracing::info!(
            "Simulating cohort {} ({} patients, {} years, {})",
            self.id,
            self.pop_size,
            horizon,
            params.therapy.label()
        );

        let mut outcomes = Vec::with_capacity(self.pop_size);
        for i in 0..self.pop_size {
            let seed = self.id * self.pop_size as u64 + i as u64;
            let mut patient = Patient::new(seed, params);
            patient.simulate(params, &sampler, horizon);
            outcomes.push(patient.outcome());
        }

        Ok(CohortOutcomes::extract(self.pop_size, outcomes))
    }
}

impl CohortOutcomes {
    fn extract(pop_size: usize, outcomes: Vec<PatientOutcome>) -> Self {
        let survival_times: Vec<f64> =
            outcomes.iter().filter_map(|o| o.survival_time).collect();
        let times_to_aids: Vec<f64> =
            outcomes.iter().filter_map(|o| o.time_to_aids).collect();
        let costs: Vec<f64> = outcomes.iter().map(|o| o.discounted_cost).collect();
        let utilities: Vec<f64> = outcomes.iter().map(|o| o.discounted_utility).collect();

        let survival_curve = survival_curve(pop_size, &survival_times);

        tracing::info!(
            "Cohort complete: {}/{} died within the horizon, {} developed AIDS",
            survival_times.len(),
            pop_size,
            times_to_aids.len()
        );

        Self {
            stat_survival_time: SummaryStat::from_sample(&survival_times),
            stat_time_to_aids: SummaryStat::from_sample(&times_to_aids),
            stat_cost: SummaryStat::from_sample(&costs),
            stat_utility: SummaryStat::from_sample(&utilities),
            outcomes,
            survival_times,
            times_to_aids,
            costs,
            utilities,
            survival_curve,
        }
    }

    /// Patients still alive at the horizon
    pub fn survivors(&self) -> usize {
        self.outcomes.len() - self.survival_times.len()
    }
}

/// Build the population survival curve from recorded death times.
///
/// Starts at `(0, pop_size)` and applies a decrement of one at each death
/// time in ascending order; simultaneous deaths collapse into a single step.
fn survival_curve(pop_size: usize, survival_times: &[f64]) -> Vec<SurvivalPoint> {
    let mut times = survival_times.to_vec();
    times.sort_by(|a, b| a.total_cmp(b));

    let mut curve = vec![SurvivalPoint {
        time: 0.0,
        alive: pop_size,
    }];

    let mut alive = pop_size;
    let mut i = 0;
    while i < times.len() {
        let t = times[i];
        let mut deaths = 0;
        while i < times.len() && times[i] == t {
            deaths += 1;
            i += 1;
        }
        alive -= deaths;
        curve.push(SurvivalPoint { time: t, alive });
    }

    curve
}
