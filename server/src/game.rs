use crate::grid::{Grid, GridError};
use crate::layout::MazeLayout;
use crate::pathfinder::{self, PathResult};
use log::{debug, error, info};
use shared::{CellKind, Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    WallCollision,
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moved {
        to: Position,
        collected_coin: bool,
        /// Set only on the move that picks up the last coin
        victory: bool,
    },
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Won,
}

/// The authoritative state of one maze game
///
/// Invariants held across every public call:
/// - exactly one `PlayerHere` cell, at `player`
/// - `coins_remaining` equals the number of `Coin` cells
/// - walls never change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    layout: MazeLayout,
    grid: Grid,
    player: Position,
    coins_remaining: usize,
    leave_trail: bool,
}

impl GameState {
    pub fn new(layout: MazeLayout) -> Self {
        let grid = layout.grid().clone();
        let player = layout.start();
        let coins_remaining = grid.count(CellKind::Coin);

        Self {
            layout,
            grid,
            player,
            coins_remaining,
            leave_trail: false,
        }
    }

    /// Marks vacated cells with `Trail` instead of `Floor`
    pub fn with_trail(mut self, leave_trail: bool) -> Self {
        self.leave_trail = leave_trail;
        self
    }

    /// Current maze, player and trail cells included
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player_position(&self) -> Position {
        self.player
    }

    pub fn coins_remaining(&self) -> usize {
        self.coins_remaining
    }

    /// `Won` once every coin has been collected. Movement is still allowed.
    pub fn phase(&self) -> Phase {
        if self.coins_remaining == 0 {
            Phase::Won
        } else {
            Phase::InProgress
        }
    }

    /// Moves the player one cell. A rejected move leaves the state untouched.
    pub fn apply_move(&mut self, direction: Direction) -> MoveResult {
        let Some(candidate) = direction.step(self.player) else {
            return MoveResult::Rejected(RejectReason::OutOfBounds);
        };

        let target = match self.grid.cell_at(candidate) {
            Ok(CellKind::Wall) => {
                debug!("Hit a wall at {}", candidate);
                return MoveResult::Rejected(RejectReason::WallCollision);
            }
            Ok(kind) => kind,
            Err(_) => {
                debug!("Proposed move out of bounds: {}", candidate);
                return MoveResult::Rejected(RejectReason::OutOfBounds);
            }
        };

        // Both cells were bounds-checked above, so this cannot fail halfway
        if let Err(e) = self.relocate_player(candidate) {
            error!("Grid refused a validated move: {}", e);
            return MoveResult::Rejected(RejectReason::OutOfBounds);
        }

        let collected_coin = target == CellKind::Coin;
        if collected_coin {
            self.coins_remaining -= 1;
            info!("Coin collected! Coins remaining: {}", self.coins_remaining);
        }

        MoveResult::Moved {
            to: candidate,
            collected_coin,
            victory: collected_coin && self.coins_remaining == 0,
        }
    }

    fn relocate_player(&mut self, to: Position) -> Result<(), GridError> {
        let vacated = if self.leave_trail {
            CellKind::Trail
        } else {
            CellKind::Floor
        };
        self.grid.cell_at(to)?;
        self.grid.set_cell_at(self.player, vacated)?;
        self.grid.set_cell_at(to, CellKind::PlayerHere)?;
        self.player = to;
        Ok(())
    }

    /// Nearest reachable coin from the player. Read-only.
    pub fn query_nearest_coin(&self) -> Option<Position> {
        pathfinder::nearest_coin(&self.grid, self.player)
    }

    /// Nearest-coin lookup, optionally with the shortest route to it
    pub fn locate_nearest_coin(&self, with_route: bool) -> PathResult {
        let Some(target) = self.query_nearest_coin() else {
            return PathResult::NotFound;
        };

        if !with_route {
            return PathResult::Found(target);
        }

        match pathfinder::shortest_path_to(&self.grid, self.player, target) {
            Some(route) => PathResult::FoundWithRoute(route),
            None => PathResult::NotFound,
        }
    }

    /// Restores the starting layout, coins included.
    ///
    /// This is the only way the coin count goes back up and the only
    /// non-move command that changes the maze.
    pub fn reset(&mut self) {
        self.grid = self.layout.grid().clone();
        self.player = self.layout.start();
        self.coins_remaining = self.grid.count(CellKind::Coin);
        info!("Maze reset, {} coins placed", self.coins_remaining);
    }

    /// Deterministic text form sent to clients after every command
    pub fn render_snapshot(&self) -> String {
        let mut snapshot = format!(
            "Player position: {}\nCoins remaining: {}\n",
            self.player, self.coins_remaining
        );
        for row in self.grid.rows() {
            snapshot.push_str(&row);
            snapshot.push('\n');
        }
        snapshot
    }
}
