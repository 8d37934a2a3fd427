//! Agent state and movement.

use contagion_core::{Bounds, HealthStatus, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest displacement along a single axis in one step
pub const MAX_STEP: i32 = 3;

/// An individual in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub position: Position,
    pub is_infected: bool,
    /// Step of the most recent infection onset; `None` if never infected
    pub infected_on: Option<u64>,
    pub is_alive: bool,
}

impl Agent {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            is_infected: false,
            infected_on: None,
            is_alive: true,
        }
    }

    /// Displace by a random integer offset in `[-MAX_STEP, MAX_STEP]` on each axis,
    /// then clamp back onto the plane. Draws x before y.
    pub fn move_randomly<R: Rng>(&mut self, bounds: Bounds, rng: &mut R) {
        let dx = rng.gen_range(-MAX_STEP..=MAX_STEP);
        let dy = rng.gen_range(-MAX_STEP..=MAX_STEP);
        self.position = self
            .position
            .add(f64::from(dx), f64::from(dy))
            .clamp(bounds);
    }

    pub fn distance(&self, other: &Agent) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn status(&self) -> HealthStatus {
        if !self.is_alive {
            HealthStatus::Dead
        } else if self.is_infected {
            HealthStatus::Sick
        } else if self.infected_on.is_none() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Recovered
        }
    }

    pub fn infect(&mut self, step: u64) {
        self.is_infected = true;
        self.infected_on = Some(step);
    }

    /// Whether the current infection has run for at least `duration` steps
    pub fn infection_expired(&self, step: u64, duration: u64) -> bool {
        match self.infected_on {
            Some(onset) if self.is_alive && self.is_infected => {
                step.saturating_sub(onset) >= duration
            }
            _ => false,
        }
    }

    /// Clear the infection; `infected_on` is kept as history
    pub fn recover(&mut self) {
        self.is_infected = false;
    }

    pub fn die(&mut self) {
        self.is_alive = false;
    }
}
