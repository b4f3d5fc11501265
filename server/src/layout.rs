//! Starting mazes: parsing and validation of ASCII layouts

use crate::grid::Grid;
use shared::{CellKind, Position, REFERENCE_MAZE};
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum LayoutError {
    Empty,
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownSymbol {
        position: Position,
        symbol: char,
    },
    PlayerCount(usize),
    Io(std::io::Error),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "maze layout has no rows"),
            LayoutError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, found, expected
            ),
            LayoutError::UnknownSymbol { position, symbol } => {
                write!(f, "unknown symbol {:?} at {}", symbol, position)
            }
            LayoutError::PlayerCount(count) => {
                write!(f, "maze needs exactly one player cell, found {}", count)
            }
            LayoutError::Io(e) => write!(f, "failed to read maze layout: {}", e),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(e: std::io::Error) -> Self {
        LayoutError::Io(e)
    }
}

/// A validated starting maze: the grid plus where the player begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeLayout {
    grid: Grid,
    start: Position,
}

impl MazeLayout {
    /// Parses one row per line. Blank lines are skipped so files may end
    /// with a newline.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows
            .first()
            .map(|row| row.chars().count())
            .ok_or(LayoutError::Empty)?;
        let mut cells = Vec::with_capacity(rows.len() * width);
        let mut players = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    row: r,
                    expected: width,
                    found,
                });
            }

            for (c, symbol) in row.chars().enumerate() {
                let position = Position::new(r, c);
                let kind = CellKind::from_symbol(symbol)
                    .ok_or(LayoutError::UnknownSymbol { position, symbol })?;
                if kind == CellKind::PlayerHere {
                    players.push(position);
                }
                cells.push(kind);
            }
        }

        match players.as_slice() {
            [start] => Ok(Self {
                grid: Grid::from_cells(rows.len(), width, cells),
                start: *start,
            }),
            _ => Err(LayoutError::PlayerCount(players.len())),
        }
    }

    pub fn reference() -> Result<Self, LayoutError> {
        Self::parse(&REFERENCE_MAZE.join("\n"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }
}
