//! Export of cohort outcomes for downstream reporting and plotting.
//!
//! The simulation core only produces in-memory collections; these helpers
//! materialize them as plain files so external tooling (plotting, spreadsheet
//! analysis) never has to touch the engine.

use crate::{CohortOutcomes, PatientOutcome, Result, SummaryStat, SurvivalPoint, Therapy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

/// A row in the per-patient outcomes CSV
#[derive(Debug, Serialize)]
struct OutcomeRow {
    patient_id: u64,
    survival_time: Option<f64>,
    time_to_aids: Option<f64>,
    developed_aids: bool,
    discounted_cost: f64,
    discounted_utility: f64,
}

impl From<&PatientOutcome> for OutcomeRow {
    fn from(outcome: &PatientOutcome) -> Self {
        OutcomeRow {
            patient_id: outcome.patient_id,
            survival_time: outcome.survival_time,
            time_to_aids: outcome.time_to_aids,
            developed_aids: outcome.developed_aids,
            discounted_cost: outcome.discounted_cost,
            discounted_utility: outcome.discounted_utility,
        }
    }
}

/// Write one CSV row per patient (empty fields mark censored times)
pub fn write_outcomes_csv(path: &Path, outcomes: &[PatientOutcome]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for outcome in outcomes {
        writer.serialize(OutcomeRow::from(outcome))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} patient outcomes to {:?}", outcomes.len(), path);
    Ok(())
}

/// Write the population survival curve as (time, alive) rows
pub fn write_survival_curve_csv(path: &Path, curve: &[SurvivalPoint]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for point in curve {
        writer.serialize(point)?;
    }
    writer.flush()?;

    tracing::info!("Wrote survival curve ({} points) to {:?}", curve.len(), path);
    Ok(())
}

/// Summary report of one cohort run, for machine consumption
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub simulated_at: DateTime<Utc>,
    pub therapy: Therapy,
    pub cohort_id: u64,
    pub pop_size: usize,
    pub time_horizon_years: f64,
    /// Deaths observed within the horizon; the survival-time statistics
    /// cover only these patients (right-censored sample)
    pub deaths_within_horizon: usize,
    pub survival_time: SummaryStat,
    pub time_to_aids: SummaryStat,
    pub discounted_cost: SummaryStat,
    pub discounted_utility: SummaryStat,
}

impl RunReport {
    pub fn new(
        therapy: Therapy,
        cohort_id: u64,
        pop_size: usize,
        time_horizon_years: f64,
        outcomes: &CohortOutcomes,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            simulated_at: Utc::now(),
            therapy,
            cohort_id,
            pop_size,
            time_horizon_years,
            deaths_within_horizon: outcomes.survival_times.len(),
            survival_time: outcomes.stat_survival_time.clone(),
            time_to_aids: outcomes.stat_time_to_aids.clone(),
            discounted_cost: outcomes.stat_cost.clone(),
            discounted_utility: outcomes.stat_utility.clone(),
        }
    }
}

/// Write the run report as pretty-printed JSON
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(report)?;
    std::fs::write(path, contents)?;

    tracing::info!("Wrote run report {} to {:?}", report.run_id, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cohort, Parameters, Scenario, Therapy};

    fn simulated() -> CohortOutcomes {
        let params = Parameters::from_scenario(&Scenario::default(), Therapy::Mono).unwrap();
        Cohort::new(1, 10).simulate(&params, 20.0).unwrap()
    }

    #[test]
    fn test_outcomes_csv_has_one_row_per_patient() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("outcomes.csv");

        let outcomes = simulated();
        write_outcomes_csv(&path, &outcomes.outcomes).unwrap();

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 10);
    }

    #[test]
    fn test_survival_curve_csv_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("survival_curve.csv");

        let outcomes = simulated();
        write_survival_curve_csv(&path, &outcomes.survival_curve).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<SurvivalPoint> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), outcomes.survival_curve.len());
        assert_eq!(rows[0].alive, 10);
    }

    #[test]
    fn test_report_json_is_parseable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("report.json");

        let outcomes = simulated();
        let report = RunReport::new(Therapy::Mono, 1, 10, 20.0, &outcomes);
        write_report_json(&path, &report).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["therapy"], "mono");
        assert_eq!(value["pop_size"], 10);
        assert!(value["discounted_cost"]["mean"].as_f64().unwrap() > 0.0);
    }
}
