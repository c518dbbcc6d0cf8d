use clap::{Parser, Subcommand};
use cohort_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prognos")]
#[command(about = "Continuous-time Markov cohort simulator for HIV therapy evaluation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override scenario file
    #[arg(long, global = true)]
    scenario: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one cohort and report its outcomes (default)
    Run {
        /// Therapy arm (mono, combo)
        #[arg(long, default_value = "mono")]
        therapy: String,

        /// Cohort identifier (drives patient seeding)
        #[arg(long, default_value_t = 1)]
        cohort_id: u64,

        /// Override the scenario's population size
        #[arg(long)]
        pop_size: Option<usize>,

        /// Override the scenario's simulation horizon (years)
        #[arg(long)]
        horizon: Option<f64>,

        /// Write outcomes.csv, survival_curve.csv and report.json here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Simulate both therapy arms and report incremental outcomes
    Compare {
        /// Cohort identifier (shared by both arms)
        #[arg(long, default_value_t = 1)]
        cohort_id: u64,

        /// Override the scenario's population size
        #[arg(long)]
        pop_size: Option<usize>,

        /// Override the scenario's simulation horizon (years)
        #[arg(long)]
        horizon: Option<f64>,
    },

    /// Write the built-in scenario as a TOML file for editing
    InitScenario {
        /// Destination path (defaults to the standard config location)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    cohort_core::logging::init();

    let cli = Cli::parse();
    let scenario = load_scenario(cli.scenario.as_deref())?;

    match cli.command {
        Some(Commands::Run {
            therapy,
            cohort_id,
            pop_size,
            horizon,
            out_dir,
        }) => cmd_run(&scenario, &therapy, cohort_id, pop_size, horizon, out_dir),
        Some(Commands::Compare {
            cohort_id,
            pop_size,
            horizon,
        }) => cmd_compare(&scenario, cohort_id, pop_size, horizon),
        Some(Commands::InitScenario { path, force }) => cmd_init_scenario(path, force),
        None => cmd_run(&scenario, "mono", 1, None, None, None),
    }
}

fn load_scenario(path: Option<&std::path::Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load_from(path),
        None => Scenario::load(),
    }
}

fn parse_therapy(name: &str) -> Result<Therapy> {
    match name.to_lowercase().as_str() {
        "mono" => Ok(Therapy::Mono),
        "combo" => Ok(Therapy::Combo),
        other => Err(Error::Other(format!(
            "unknown therapy '{}' (expected 'mono' or 'combo')",
            other
        ))),
    }
}

fn cmd_run(
    scenario: &Scenario,
    therapy: &str,
    cohort_id: u64,
    pop_size: Option<usize>,
    horizon: Option<f64>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let therapy = parse_therapy(therapy)?;
    let pop_size = pop_size.unwrap_or(scenario.population.pop_size);
    let horizon = horizon.unwrap_or(scenario.population.time_horizon_years);

    tracing::info!(
        "Running cohort {} on {} ({} patients, {} years)",
        cohort_id,
        therapy.label(),
        pop_size,
        horizon
    );

    let params = Parameters::from_scenario(scenario, therapy)?;
    let cohort = Cohort::new(cohort_id, pop_size);
    let outcomes = cohort.simulate(&params, horizon)?;

    display_outcomes(therapy, pop_size, horizon, &outcomes);

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(&dir)?;
        write_outcomes_csv(&dir.join("outcomes.csv"), &outcomes.outcomes)?;
        write_survival_curve_csv(&dir.join("survival_curve.csv"), &outcomes.survival_curve)?;
        let report = RunReport::new(therapy, cohort_id, pop_size, horizon, &outcomes);
        write_report_json(&dir.join("report.json"), &report)?;

        println!("✓ Exported outcomes to {}", dir.display());
    }

    Ok(())
}

fn cmd_compare(
    scenario: &Scenario,
    cohort_id: u64,
    pop_size: Option<usize>,
    horizon: Option<f64>,
) -> Result<()> {
    let pop_size = pop_size.unwrap_or(scenario.population.pop_size);
    let horizon = horizon.unwrap_or(scenario.population.time_horizon_years);
    let cohort = Cohort::new(cohort_id, pop_size);

    let mut results = Vec::new();
    for therapy in [Therapy::Mono, Therapy::Combo] {
        let params = Parameters::from_scenario(scenario, therapy)?;
        let outcomes = cohort.simulate(&params, horizon)?;
        display_outcomes(therapy, pop_size, horizon, &outcomes);
        results.push(outcomes);
    }

    let (mono, combo) = (&results[0], &results[1]);
    let delta_cost = combo.stat_cost.mean - mono.stat_cost.mean;
    let delta_utility = combo.stat_utility.mean - mono.stat_utility.mean;

    println!("╭─────────────────────────────────────────╮");
    println!("│  COMBINATION vs MONO                    │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Δ survival (mean, observed deaths): {:+.3} years",
        combo.stat_survival_time.mean - mono.stat_survival_time.mean);
    println!("  Δ discounted cost:    {:+.2}", delta_cost);
    println!("  Δ discounted utility: {:+.4}", delta_utility);
    if delta_utility.abs() > f64::EPSILON {
        println!(
            "  Cost per utility gained: {:.2}",
            delta_cost / delta_utility
        );
    }
    println!();

    Ok(())
}

fn cmd_init_scenario(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(Scenario::default_scenario_path);

    if path.exists() && !force {
        return Err(Error::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    default_scenario().save_to(&path)?;
    println!("✓ Wrote default scenario to {}", path.display());
    Ok(())
}

fn display_outcomes(therapy: Therapy, pop_size: usize, horizon: f64, outcomes: &CohortOutcomes) {
    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│  {}", therapy.label().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} patients over {} years, {} deaths, {} AIDS cases",
        pop_size,
        horizon,
        outcomes.survival_times.len(),
        outcomes.times_to_aids.len()
    );
    println!();

    display_stat("Survival time (years)", &outcomes.stat_survival_time);
    display_stat("Time to AIDS (years)", &outcomes.stat_time_to_aids);
    display_stat("Discounted cost", &outcomes.stat_cost);
    display_stat("Discounted utility", &outcomes.stat_utility);
    println!();
}

fn display_stat(name: &str, stat: &SummaryStat) {
    if stat.n == 0 {
        println!("  {:<24} no observed events", name);
        return;
    }
    println!(
        "  {:<24} mean {:.3}  (95% CI {:.3} to {:.3}, n={})",
        name, stat.mean, stat.ci95_lower, stat.ci95_upper, stat.n
    );
}
