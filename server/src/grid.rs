//! Fixed-shape cell store for the maze
//!
//! The grid only knows about bounds. Game rules (one player cell, coin
//! bookkeeping) live in [`crate::game::GameState`], which owns the only grid.

use shared::{CellKind, Position};
use std::fmt;

/// Raised when a caller addresses a cell outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds {
        position: Position,
        height: usize,
        width: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds {
                position,
                height,
                width,
            } => write!(
                f,
                "position {} is outside the {}x{} grid",
                position, height, width
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Row-major 2D store of cell kinds with dimensions fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    #[cfg(test)]
    fn filled(height: usize, width: usize, kind: CellKind) -> Self {
        Self {
            height,
            width,
            cells: vec![kind; height * width],
        }
    }

    /// Builds a grid from rows that the caller has already checked to be
    /// rectangular. Used by the layout parser.
    pub(crate) fn from_cells(height: usize, width: usize, cells: Vec<CellKind>) -> Self {
        debug_assert_eq!(cells.len(), height * width);
        Self {
            height,
            width,
            cells,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    fn index(&self, pos: Position) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok(pos.row * self.width + pos.col)
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Reads a cell, failing for positions outside the grid
    pub fn cell_at(&self, pos: Position) -> Result<CellKind, GridError> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrites a cell. No rule checking beyond bounds.
    pub fn set_cell_at(&mut self, pos: Position, kind: CellKind) -> Result<(), GridError> {
        let i = self.index(pos)?;
        self.cells[i] = kind;
        Ok(())
    }

    /// True for in-bounds cells that are not walls
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.cell_at(pos).map_or(false, CellKind::is_walkable)
    }

    /// Number of cells of the given kind
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|&&cell| cell == kind).count()
    }

    /// All positions holding the given kind, in row-major order
    pub fn positions_of(&self, kind: CellKind) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == kind)
            .map(|(i, _)| Position::new(i / self.width, i % self.width))
            .collect()
    }

    /// Renders each row as its symbol string
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
    }
}
