//! Headless driver for contagion simulation runs.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use contagion_core::RunConfig;
use contagion_world::{Agent, Simulation, StepRecord};
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "contagion-runner", about = "Run an epidemic simulation until it burns out")]
struct Args {
    /// JSON run configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Override the number of seeded infections
    #[arg(long)]
    infected: Option<usize>,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Log statistics every N steps
    #[arg(long, default_value_t = 1)]
    log_every: u64,

    /// Write the run summary as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.population {
            config.population.size = size;
        }
        if let Some(infected) = self.infected {
            config.population.initial_infected = infected;
        }
        if self.max_steps.is_some() {
            config.max_steps = self.max_steps;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    let config = args.run_config()?;
    info!(
        seed = config.seed,
        population = config.population.size,
        initial_infected = config.population.initial_infected,
        "Starting contagion run"
    );

    let mut simulation = Simulation::new(config)?;
    let log_every = args.log_every.max(1);
    let mut observer = |record: &StepRecord, _agents: &[Agent]| -> ControlFlow<()> {
        if record.step % log_every == 0 {
            info!(step = record.step, "SIMULATOR STEP {}\n\t{}", record.step, record.stats);
        }
        ControlFlow::Continue(())
    };

    let summary = simulation.run(&mut observer);
    info!(
        outcome = ?summary.outcome,
        steps = summary.steps,
        "Run finished: {}",
        summary.final_stats
    );

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote run summary");
    }

    Ok(())
}
