//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Bounds;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Disease parameters, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    /// Radius within which transmission may occur; also the spatial cell size
    pub max_transmission_distance: f64,
    /// Per-contact infection probability for a never-infected agent
    pub transmission_rate: f64,
    /// Probability of death when an infection runs its course
    pub fatality_rate: f64,
    /// Number of steps an infection lasts
    pub duration: u64,
    /// Per-contact infection probability for a recovered agent
    pub reinfection_ratio: f64,
}

impl Default for Disease {
    fn default() -> Self {
        Self {
            max_transmission_distance: 15.0,
            transmission_rate: 0.1,
            fatality_rate: 0.1,
            duration: 15,
            reinfection_ratio: 0.01,
        }
    }
}

impl Disease {
    pub fn validate(&self) -> Result<()> {
        let distance = self.max_transmission_distance;
        if !distance.is_finite() || distance <= 0.0 {
            return Err(Error::Validation(format!(
                "max_transmission_distance must be a positive finite number, got {}",
                distance
            )));
        }

        check_probability("transmission_rate", self.transmission_rate)?;
        check_probability("fatality_rate", self.fatality_rate)?;
        check_probability("reinfection_ratio", self.reinfection_ratio)?;

        if self.duration == 0 {
            return Err(Error::Validation(
                "duration must be at least one step".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}

/// World configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Largest x coordinate an agent can reach
    pub max_x: f64,
    /// Largest y coordinate an agent can reach
    pub max_y: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_x: 100.0,
            max_y: 100.0,
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.max_x, self.max_y)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("max_x", self.max_x), ("max_y", self.max_y)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Validation(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Reject cell sizes so small that cell coordinates of the far edge, plus
    /// one neighbor step, would not fit in an `i64`
    pub fn check_cell_size(&self, cell_size: f64) -> Result<()> {
        let limit = (i64::MAX - 1) as f64;
        for (name, value) in [("max_x", self.max_x), ("max_y", self.max_y)] {
            let cells = (value / cell_size).ceil();
            if !cells.is_finite() || cells >= limit {
                return Err(Error::Validation(format!(
                    "max_transmission_distance {} is too small for {} = {}",
                    cell_size, name, value
                )));
            }
        }
        Ok(())
    }
}

/// Population configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents created at startup
    pub size: usize,
    /// Number of distinct agents infected before the first step
    pub initial_infected: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            initial_infected: 1,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_infected > self.size {
            return Err(Error::Validation(format!(
                "cannot seed {} infections in a population of {}",
                self.initial_infected, self.size
            )));
        }
        Ok(())
    }
}

/// Full configuration of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Hard cap on the number of steps; `None` runs until the epidemic ends
    #[serde(default)]
    pub max_steps: Option<u64>,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub disease: Disease,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_steps: None,
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            disease: Disease::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.world.validate()?;
        self.population.validate()?;
        self.disease.validate()?;
        self.world
            .check_cell_size(self.disease.max_transmission_distance)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), seed = config.seed, "Loaded run configuration");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
