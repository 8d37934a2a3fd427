//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Continuous position on the bounded plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Clamp each axis into `[0, bound]`
    pub fn clamp(&self, bounds: Bounds) -> Self {
        Self {
            x: self.x.clamp(0.0, bounds.max_x),
            y: self.y.clamp(0.0, bounds.max_y),
        }
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Grid cell containing this position for the given cell size.
    ///
    /// Uses the ceiling of each coordinate, so a cell `c` spans `((c - 1) * size, c * size]`
    /// and the origin sits alone in cell 0 on each axis.
    pub fn cell(&self, cell_size: f64) -> CellCoord {
        CellCoord::new(
            (self.x / cell_size).ceil() as i64,
            (self.y / cell_size).ceil() as i64,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Inclusive upper limits of the plane; the lower limit is always the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(max_x: f64, max_y: f64) -> Self {
        Self { max_x, max_y }
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0.0..=self.max_x).contains(&pos.x) && (0.0..=self.max_y).contains(&pos.y)
    }
}

/// Integer coordinate of a spatial cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i64,
    pub y: i64,
}

impl CellCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Shifted coordinate; saturates at the `i64` limits instead of wrapping
    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Health classification of a single agent.
///
/// Exactly one variant holds for every agent. Renderers map these onto their
/// four marker colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Alive and never infected
    Healthy,
    /// Alive and currently infected
    Sick,
    /// Alive, infected at least once, not currently infected
    Recovered,
    Dead,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Sick => "sick",
            HealthStatus::Recovered => "recovered",
            HealthStatus::Dead => "dead",
        };
        f.write_str(name)
    }
}
