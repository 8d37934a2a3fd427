//! Epidemic simulation engine.
//!
//! Agents wander a bounded plane while an infection spreads between those
//! within transmission distance of each other. Proximity is resolved through a
//! uniform grid of cells sized to that distance.

pub mod agent;
pub mod spatial;
pub mod transmission;
pub mod simulation;

pub use agent::Agent;
pub use spatial::{CellContacts, SpatialIndex};
pub use simulation::{Outcome, RunSummary, Simulation, StepObserver, StepRecord};
