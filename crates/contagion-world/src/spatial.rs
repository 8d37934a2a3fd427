//! Uniform grid bucketing of agents for proximity queries.
//!
//! Agents are bucketed into square cells whose side equals the maximum
//! transmission distance, so every possible source of infection for an agent
//! lies in its own cell or in one of the cells reported by [`neighbors`].
//! The index is rebuilt from scratch every step.

use crate::agent::Agent;
use contagion_core::CellCoord;
use indexmap::IndexMap;

/// Agents bucketed into one cell, by arena index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub infected: Vec<usize>,
    pub healthy: Vec<usize>,
}

/// Healthy agents of a cell together with every infected agent they may meet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContacts {
    pub cell: CellCoord,
    pub healthy: Vec<usize>,
    /// The cell's own infected followed by those of each neighbor cell, duplicates kept
    pub contacts: Vec<usize>,
}

/// Cells adjacent to `cell` that contribute to its contact pool.
///
/// The relation is deliberately one-sided: the three cells above and to the
/// right are always included, the others only when the corresponding
/// coordinate of `cell` is positive. The cell itself is reported when `y > 0`.
pub fn neighbors(cell: CellCoord) -> Vec<CellCoord> {
    let mut out = Vec::with_capacity(8);
    out.push(cell.offset(0, 1));
    out.push(cell.offset(1, 1));
    out.push(cell.offset(1, 0));
    if cell.y > 0 {
        out.push(cell.offset(1, -1));
        out.push(cell);
    }
    if cell.x > 0 {
        out.push(cell.offset(-1, 0));
        out.push(cell.offset(-1, 1));
    }
    if cell.x > 0 && cell.y > 0 {
        out.push(cell.offset(-1, -1));
    }
    out
}

/// Grid of occupied cells, in order of first occupation
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: IndexMap<CellCoord, Cell>,
}

impl SpatialIndex {
    /// `cell_size` must be positive; disease validation guarantees this.
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0);
        Self {
            cell_size,
            cells: IndexMap::new(),
        }
    }

    /// Bucket every living agent
    pub fn build(cell_size: f64, agents: &[Agent]) -> Self {
        let mut index = Self::new(cell_size);
        for (idx, agent) in agents.iter().enumerate() {
            index.insert(idx, agent);
        }
        index
    }

    /// Place one agent in its cell. Dead agents are ignored.
    pub fn insert(&mut self, idx: usize, agent: &Agent) {
        if !agent.is_alive {
            return;
        }

        let coord = agent.position.cell(self.cell_size);
        let cell = self.cells.entry(coord).or_default();
        if agent.is_infected {
            cell.infected.push(idx);
        } else {
            cell.healthy.push(idx);
        }
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Infected agents that may reach the healthy agents of `coord`
    pub fn contact_pool(&self, coord: CellCoord) -> Vec<usize> {
        let mut pool = self
            .cell(coord)
            .map(|cell| cell.infected.clone())
            .unwrap_or_default();

        for neighbor in neighbors(coord) {
            if let Some(cell) = self.cells.get(&neighbor) {
                pool.extend_from_slice(&cell.infected);
            }
        }

        pool
    }

    /// Healthy list and contact pool of every occupied cell
    pub fn resolve(&self) -> Vec<CellContacts> {
        self.cells
            .iter()
            .map(|(coord, cell)| CellContacts {
                cell: *coord,
                healthy: cell.healthy.clone(),
                contacts: self.contact_pool(*coord),
            })
            .collect()
    }
}
