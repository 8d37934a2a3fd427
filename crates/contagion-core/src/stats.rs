//! Aggregate population statistics.

use crate::types::HealthStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of the population at a step boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub sick: usize,
    /// Alive and never infected
    pub healthy: usize,
    pub recovered: usize,
    pub dead: usize,
    pub alive: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one agent
    pub fn record(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Dead => {
                self.dead += 1;
                return;
            }
            HealthStatus::Sick => self.sick += 1,
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Recovered => self.recovered += 1,
        }
        self.alive += 1;
    }

    pub fn total(&self) -> usize {
        self.alive + self.dead
    }

    /// The epidemic is over once nobody is sick or nobody is left alive
    pub fn is_terminal(&self) -> bool {
        self.sick == 0 || self.alive == 0
    }
}

impl FromIterator<HealthStatus> for Stats {
    fn from_iter<I: IntoIterator<Item = HealthStatus>>(iter: I) -> Self {
        let mut stats = Stats::new();
        for status in iter {
            stats.record(status);
        }
        stats
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sick={} healthy={} recovered={} dead={} alive={}",
            self.sick, self.healthy, self.recovered, self.dead, self.alive
        )
    }
}
