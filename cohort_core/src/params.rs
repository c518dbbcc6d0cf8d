//! Immutable per-run simulation parameters.
//!
//! `Parameters` is constructed once per cohort run from a validated scenario
//! and a therapy choice, and is shared read-only by every patient. No
//! component keeps a private mutable copy.

use crate::{
    rates, HealthState, RateMatrix, Result, Scenario, Therapy,
};

/// Everything a patient simulation reads, fixed for the whole cohort
#[derive(Clone, Debug)]
pub struct Parameters {
    pub therapy: Therapy,
    pub initial_state: HealthState,
    /// Annual cost of the therapy's drugs, accrued while the patient is alive
    pub annual_treatment_cost: f64,
    pub rate_matrix: RateMatrix,
    /// Annual cost of care per state, indexed by `HealthState::index`
    pub annual_state_costs: Vec<f64>,
    /// Annual utility per state, indexed by `HealthState::index`
    pub annual_state_utilities: Vec<f64>,
    pub discount_rate: f64,
}

impl Parameters {
    /// Build run parameters for one therapy arm
    pub fn from_scenario(scenario: &Scenario, therapy: Therapy) -> Result<Self> {
        scenario.validate()?;

        let annual_treatment_cost = match therapy {
            Therapy::Mono => scenario.therapy.zidovudine_annual_cost,
            Therapy::Combo => {
                scenario.therapy.zidovudine_annual_cost + scenario.therapy.lamivudine_annual_cost
            }
        };

        let probs = rates::trans_prob_matrix(&scenario.transitions.counts)?;
        let mono_matrix = rates::trans_rate_matrix(
            &probs,
            scenario.transitions.annual_background_mortality_prob,
        )?;

        let rate_matrix = match therapy {
            Therapy::Mono => mono_matrix,
            Therapy::Combo => {
                rates::trans_rate_matrix_combo(&mono_matrix, scenario.therapy.combo_relative_risk)?
            }
        };

        tracing::debug!(
            "Built {} parameters (annual treatment cost {})",
            therapy.label(),
            annual_treatment_cost
        );

        Ok(Self {
            therapy,
            initial_state: HealthState::Cd4Between200And500,
            annual_treatment_cost,
            rate_matrix,
            annual_state_costs: scenario.economics.annual_state_costs.clone(),
            annual_state_utilities: scenario.economics.annual_state_utilities.clone(),
            discount_rate: scenario.economics.discount_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_parameters() {
        let scenario = Scenario::default();
        let params = Parameters::from_scenario(&scenario, Therapy::Mono).unwrap();

        assert_eq!(params.therapy, Therapy::Mono);
        assert_eq!(params.initial_state, HealthState::Cd4Between200And500);
        assert_eq!(params.annual_treatment_cost, 2278.0);
        assert_eq!(params.rate_matrix.size(), HealthState::COUNT);
    }

    #[test]
    fn test_combo_parameters_add_both_drug_costs() {
        let scenario = Scenario::default();
        let params = Parameters::from_scenario(&scenario, Therapy::Combo).unwrap();

        assert_eq!(params.annual_treatment_cost, 2278.0 + 2086.0);
    }

    #[test]
    fn test_combo_slows_progression() {
        let scenario = Scenario::default();
        let mono = Parameters::from_scenario(&scenario, Therapy::Mono).unwrap();
        let combo = Parameters::from_scenario(&scenario, Therapy::Combo).unwrap();

        let from = HealthState::Cd4Between200And500.index();
        let to = HealthState::Cd4Below200.index();
        assert!(combo.rate_matrix.get(from, to) < mono.rate_matrix.get(from, to));
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let mut scenario = Scenario::default();
        scenario.population.pop_size = 0;
        assert!(Parameters::from_scenario(&scenario, Therapy::Mono).is_err());
    }
}
