//! Simulation engine stepping a population through an epidemic.

use crate::agent::Agent;
use crate::spatial::SpatialIndex;
use crate::transmission;
use contagion_core::{Bounds, Error, Position, Result, RunConfig, Stats};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, info, instrument, trace};

/// Receives every completed step of [`Simulation::run`].
///
/// This is where renderers and other callers hook in. Returning
/// `ControlFlow::Break` stops the run before the next step.
pub trait StepObserver {
    fn on_step(&mut self, record: &StepRecord, agents: &[Agent]) -> ControlFlow<()>;
}

impl<F> StepObserver for F
where
    F: FnMut(&StepRecord, &[Agent]) -> ControlFlow<()>,
{
    fn on_step(&mut self, record: &StepRecord, agents: &[Agent]) -> ControlFlow<()> {
        self(record, agents)
    }
}

impl StepObserver for () {
    fn on_step(&mut self, _record: &StepRecord, _agents: &[Agent]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// What happened during a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub stats: Stats,
    pub new_infections: usize,
    pub recoveries: usize,
    pub deaths: usize,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No agent is sick any more
    BurnedOut,
    /// Every agent has died
    Extinct,
    /// The observer asked to stop
    Aborted,
    /// `max_steps` was reached
    StepLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub steps: u64,
    pub outcome: Outcome,
    pub initial_stats: Stats,
    pub final_stats: Stats,
    pub peak_sick: usize,
    pub peak_step: u64,
    pub history: Vec<StepRecord>,
}

pub struct Simulation {
    agents: Vec<Agent>,
    config: RunConfig,
    bounds: Bounds,
    rng: ChaCha8Rng,
    step_num: u64,
}

impl Simulation {
    /// Place `config.population.size` agents at random integer positions and
    /// seed `config.population.initial_infected` of them.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let bounds = config.world.bounds();
        let max_x = bounds.max_x.floor() as i64;
        let max_y = bounds.max_y.floor() as i64;

        let agents = (0..config.population.size)
            .map(|_| {
                let x = rng.gen_range(0..=max_x) as f64;
                let y = rng.gen_range(0..=max_y) as f64;
                Agent::new(Position::new(x, y))
            })
            .collect();

        let initial_infected = config.population.initial_infected;
        let mut sim = Self {
            agents,
            config,
            bounds,
            rng,
            step_num: 0,
        };
        sim.seed_infection(initial_infected)?;

        info!(
            event = "simulation_created",
            seed = sim.config.seed,
            population = sim.agents.len(),
            initial_infected = initial_infected,
            "Created simulation"
        );

        Ok(sim)
    }

    /// Build a simulation around an explicit population. Population settings in
    /// `config` are ignored and no infections are seeded.
    pub fn from_agents(config: RunConfig, agents: Vec<Agent>) -> Result<Self> {
        config.world.validate()?;
        config.disease.validate()?;
        config
            .world
            .check_cell_size(config.disease.max_transmission_distance)?;

        let bounds = config.world.bounds();
        for (idx, agent) in agents.iter().enumerate() {
            if !bounds.contains(agent.position) {
                return Err(Error::Validation(format!(
                    "agent {} at {} lies outside the world",
                    idx, agent.position
                )));
            }
            if agent.is_infected && agent.infected_on.is_none() {
                return Err(Error::Validation(format!(
                    "agent {} is infected without an onset step",
                    idx
                )));
            }
            if let Some(onset) = agent.infected_on.filter(|&onset| onset > 0) {
                return Err(Error::Validation(format!(
                    "agent {} has infection onset {} after the starting step 0",
                    idx, onset
                )));
            }
        }

        Ok(Self {
            agents,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            bounds,
            step_num: 0,
        })
    }

    /// Infect `count` distinct living, uninfected agents at the current step.
    ///
    /// Fails without touching any agent when fewer candidates exist.
    pub fn seed_infection(&mut self, count: usize) -> Result<Vec<usize>> {
        let candidates: Vec<usize> = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.is_alive && !agent.is_infected)
            .map(|(idx, _)| idx)
            .collect();

        if count > candidates.len() {
            return Err(Error::Validation(format!(
                "cannot seed {} infections with only {} susceptible agents",
                count,
                candidates.len()
            )));
        }

        let chosen: Vec<usize> = candidates
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        for &idx in &chosen {
            self.agents[idx].infect(self.step_num);
        }

        debug!(
            event = "infection_seeded",
            step = self.step_num,
            seeded = ?chosen,
            "Seeded infections"
        );

        Ok(chosen)
    }

    /// Advance one step: progression, movement, bucketing, transmission.
    pub fn step(&mut self) -> StepRecord {
        self.step_num += 1;
        let step = self.step_num;
        let disease = &self.config.disease;

        let mut deaths = 0;
        let mut recoveries = 0;
        for (idx, agent) in self.agents.iter_mut().enumerate() {
            if !agent.is_alive {
                continue;
            }

            if agent.infection_expired(step, disease.duration) {
                if self.rng.gen::<f64>() < disease.fatality_rate {
                    agent.die();
                    deaths += 1;
                    trace!(event = "death", agent = idx, step = step, "Agent died");
                } else {
                    agent.recover();
                    recoveries += 1;
                    trace!(event = "recovery", agent = idx, step = step, "Agent recovered");
                }
            }

            if agent.is_alive {
                agent.move_randomly(self.bounds, &mut self.rng);
            }
        }

        let index = SpatialIndex::build(disease.max_transmission_distance, &self.agents);
        let cells = index.resolve();
        let new_infections =
            transmission::transmit(&mut self.agents, &cells, disease, step, &mut self.rng);

        let stats = self.stats();
        debug!(
            event = "step_complete",
            step = step,
            occupied_cells = index.len(),
            new_infections = new_infections,
            recoveries = recoveries,
            deaths = deaths,
            sick = stats.sick,
            alive = stats.alive,
            "Step complete"
        );

        StepRecord {
            step,
            stats,
            new_infections,
            recoveries,
            deaths,
        }
    }

    /// Step until the epidemic ends, the observer stops the run, or
    /// `max_steps` is reached
    #[instrument(skip(self, observer), fields(seed = self.config.seed, population = self.agents.len()))]
    pub fn run<O: StepObserver + ?Sized>(&mut self, observer: &mut O) -> RunSummary {
        let initial_stats = self.stats();
        info!(
            event = "run_started",
            max_steps = ?self.config.max_steps,
            sick = initial_stats.sick,
            "Starting simulation run"
        );

        let mut history = Vec::new();
        let mut peak_sick = initial_stats.sick;
        let mut peak_step = self.step_num;
        let mut final_stats = initial_stats;

        let outcome = loop {
            if let Some(max_steps) = self.config.max_steps {
                if self.step_num >= max_steps {
                    break Outcome::StepLimit;
                }
            }

            let record = self.step();
            history.push(record);
            final_stats = record.stats;
            if record.stats.sick > peak_sick {
                peak_sick = record.stats.sick;
                peak_step = record.step;
            }

            let flow = observer.on_step(&record, &self.agents);

            if record.stats.alive == 0 {
                break Outcome::Extinct;
            }
            if record.stats.sick == 0 {
                break Outcome::BurnedOut;
            }
            if flow.is_break() {
                break Outcome::Aborted;
            }
        };

        info!(
            event = "run_complete",
            outcome = ?outcome,
            steps = self.step_num,
            peak_sick = peak_sick,
            peak_step = peak_step,
            dead = final_stats.dead,
            recovered = final_stats.recovered,
            healthy = final_stats.healthy,
            "Simulation run complete"
        );

        RunSummary {
            seed: self.config.seed,
            steps: self.step_num,
            outcome,
            initial_stats,
            final_stats,
            peak_sick,
            peak_step,
            history,
        }
    }

    pub fn stats(&self) -> Stats {
        self.agents.iter().map(Agent::status).collect()
    }

    /// All agents, living and dead, in creation order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of completed steps
    pub fn step_num(&self) -> u64 {
        self.step_num
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
