//! Scenario input data for Prognos.
//!
//! A scenario bundles everything the simulation consumes as read-only input:
//! the observed transition-count matrix, background mortality, per-state
//! economics, drug costs, and run defaults. Scenarios are loaded from
//! `$XDG_CONFIG_HOME/prognos/scenario.toml` (or any explicit path); every
//! field defaults to the built-in zidovudine/lamivudine cohort data, so a
//! partial file only has to name what it changes.

use crate::{Error, HealthState, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cached built-in scenario - built once and shared across all operations
static DEFAULT_SCENARIO: Lazy<Scenario> = Lazy::new(Scenario::default);

/// Get a reference to the cached built-in scenario
pub fn default_scenario() -> &'static Scenario {
    &DEFAULT_SCENARIO
}

/// Complete simulation scenario
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Scenario {
    #[serde(default)]
    pub population: PopulationConfig,

    #[serde(default)]
    pub transitions: TransitionConfig,

    #[serde(default)]
    pub therapy: TherapyConfig,

    #[serde(default)]
    pub economics: EconomicsConfig,
}

/// Cohort size and simulation horizon defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(default = "default_pop_size")]
    pub pop_size: usize,

    /// Simulation length in years
    #[serde(default = "default_time_horizon")]
    pub time_horizon_years: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            pop_size: default_pop_size(),
            time_horizon_years: default_time_horizon(),
        }
    }
}

/// Observed transition data
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Annual transition counts between HIV states. One row per living HIV
    /// state (CD4 200-500, CD4 <200, AIDS); columns cover those states plus
    /// HIV death. Row order must follow the `HealthState` ordering.
    #[serde(default = "default_transition_counts")]
    pub counts: Vec<Vec<f64>>,

    /// Annual probability of death from background (all-cause) mortality
    #[serde(default = "default_background_mortality")]
    pub annual_background_mortality_prob: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            counts: default_transition_counts(),
            annual_background_mortality_prob: default_background_mortality(),
        }
    }
}

/// Drug costs and the combination-therapy effect
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TherapyConfig {
    #[serde(default = "default_zidovudine_cost")]
    pub zidovudine_annual_cost: f64,

    #[serde(default = "default_lamivudine_cost")]
    pub lamivudine_annual_cost: f64,

    /// Relative risk of disease progression under combination therapy,
    /// in (0, 1]
    #[serde(default = "default_combo_relative_risk")]
    pub combo_relative_risk: f64,
}

impl Default for TherapyConfig {
    fn default() -> Self {
        Self {
            zidovudine_annual_cost: default_zidovudine_cost(),
            lamivudine_annual_cost: default_lamivudine_cost(),
            combo_relative_risk: default_combo_relative_risk(),
        }
    }
}

/// Per-state annual cost/utility rates and the discount rate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Annual cost of care in each health state, in `HealthState` order
    #[serde(default = "default_state_costs")]
    pub annual_state_costs: Vec<f64>,

    /// Annual health utility accrued in each state, in `HealthState` order
    #[serde(default = "default_state_utilities")]
    pub annual_state_utilities: Vec<f64>,

    /// Continuous annual discount rate
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            annual_state_costs: default_state_costs(),
            annual_state_utilities: default_state_utilities(),
            discount_rate: default_discount_rate(),
        }
    }
}

// Default value functions

fn default_pop_size() -> usize {
    1000
}

fn default_time_horizon() -> f64 {
    50.0
}

fn default_transition_counts() -> Vec<Vec<f64>> {
    vec![
        vec![1251.0, 350.0, 116.0, 17.0],
        vec![0.0, 731.0, 512.0, 15.0],
        vec![0.0, 0.0, 1312.0, 437.0],
    ]
}

fn default_background_mortality() -> f64 {
    0.008912
}

fn default_zidovudine_cost() -> f64 {
    2278.0
}

fn default_lamivudine_cost() -> f64 {
    2086.0
}

fn default_combo_relative_risk() -> f64 {
    0.509
}

fn default_state_costs() -> Vec<f64> {
    // Death states accrue nothing
    vec![2756.0, 3025.0, 9007.0, 0.0, 0.0]
}

fn default_state_utilities() -> Vec<f64> {
    vec![0.75, 0.50, 0.25, 0.0, 0.0]
}

fn default_discount_rate() -> f64 {
    0.03
}

impl Scenario {
    /// Load the scenario from the standard config path
    pub fn load() -> Result<Self> {
        let path = Self::default_scenario_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::info!(
                "No scenario file found at {:?}, using built-in scenario",
                path
            );
            Ok(Self::default())
        }
    }

    /// Load the scenario from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = toml::from_str(&contents)?;
        scenario.validate()?;
        tracing::info!("Loaded scenario from {:?}", path);
        Ok(scenario)
    }

    /// Get the default scenario file path
    pub fn default_scenario_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("prognos").join("scenario.toml")
    }

    /// Save this scenario to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Scenario(format!("Failed to serialize scenario: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved scenario to {:?}", path);
        Ok(())
    }

    /// Check the scenario against the input invariants.
    ///
    /// A failure here is a parameter-level defect shared by every patient in
    /// the cohort, so the whole run is rejected up front.
    pub fn validate(&self) -> Result<()> {
        let living = HealthState::COUNT - 2;
        let hiv_states = HealthState::COUNT - 1;

        if self.population.pop_size == 0 {
            return Err(Error::Scenario("population size must be positive".into()));
        }
        if !(self.population.time_horizon_years > 0.0)
            || !self.population.time_horizon_years.is_finite()
        {
            return Err(Error::Scenario(format!(
                "time horizon must be positive and finite, got {}",
                self.population.time_horizon_years
            )));
        }

        if self.transitions.counts.len() != living {
            return Err(Error::Scenario(format!(
                "transition counts must have {} rows (one per living HIV state), got {}",
                living,
                self.transitions.counts.len()
            )));
        }
        for (i, row) in self.transitions.counts.iter().enumerate() {
            if row.len() != hiv_states {
                return Err(Error::Scenario(format!(
                    "transition count row {} must have {} columns, got {}",
                    i,
                    hiv_states,
                    row.len()
                )));
            }
            if row.iter().any(|&c| !(c >= 0.0) || !c.is_finite()) {
                return Err(Error::Scenario(format!(
                    "transition count row {} contains a negative or non-finite entry",
                    i
                )));
            }
        }

        let mort = self.transitions.annual_background_mortality_prob;
        if !(0.0..1.0).contains(&mort) {
            return Err(Error::Scenario(format!(
                "annual background mortality probability must be in [0, 1), got {}",
                mort
            )));
        }

        let rr = self.therapy.combo_relative_risk;
        if !(rr > 0.0 && rr <= 1.0) {
            return Err(Error::Scenario(format!(
                "combo relative risk must be in (0, 1], got {}",
                rr
            )));
        }
        if self.therapy.zidovudine_annual_cost < 0.0 || self.therapy.lamivudine_annual_cost < 0.0 {
            return Err(Error::Scenario("drug costs must be non-negative".into()));
        }

        for (name, values) in [
            ("annual_state_costs", &self.economics.annual_state_costs),
            (
                "annual_state_utilities",
                &self.economics.annual_state_utilities,
            ),
        ] {
            if values.len() != HealthState::COUNT {
                return Err(Error::Scenario(format!(
                    "{} must have {} entries (one per health state), got {}",
                    name,
                    HealthState::COUNT,
                    values.len()
                )));
            }
            if values.iter().any(|&v| !(v >= 0.0) || !v.is_finite()) {
                return Err(Error::Scenario(format!(
                    "{} contains a negative or non-finite entry",
                    name
                )));
            }
        }

        if !(self.economics.discount_rate >= 0.0) || !self.economics.discount_rate.is_finite() {
            return Err(Error::Scenario(format!(
                "discount rate must be non-negative and finite, got {}",
                self.economics.discount_rate
            )));
        }

        Ok(())
    }
}
