//! Per-connection command dispatch
//!
//! Turns a decoded [`Command`] into a call on the game and formats the text
//! frame sent back: result lines, then the snapshot, then [`END_MARKER`].
//! The session owns no game data; callers hand it the state under their lock
//! so a whole command, response included, is applied atomically.

use crate::game::{GameState, MoveResult, Phase};
use crate::pathfinder::PathResult;
use log::{debug, warn};
use shared::{Command, Position, END_MARKER};

pub const INVALID_RESPONSE: &str = "Invalid move or command.";
pub const VICTORY_RESPONSE: &str = "Victory! You collected all the coins.";
pub const NO_COINS_RESPONSE: &str = "No coins remaining!";
pub const UNREACHABLE_COINS_RESPONSE: &str = "No reachable coins remaining!";
pub const RESET_RESPONSE: &str = "Maze reset.";
pub const SERVER_FULL_RESPONSE: &str = "Server full.";

/// What the transport should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Shutdown,
}

/// The unsolicited frame sent when a client connects
pub fn greeting(game: &GameState) -> String {
    frame(game, &[])
}

/// Applies one command and builds its reply frame.
///
/// Moves, queries and `reset` produce a frame that ends with the updated
/// snapshot. `kill` produces [`Outcome::Shutdown`] and leaves the game as
/// it was.
pub fn dispatch(game: &mut GameState, command: &Command) -> Outcome {
    let lines = match command {
        Command::Shutdown => return Outcome::Shutdown,
        Command::Move(direction) => match game.apply_move(*direction) {
            MoveResult::Moved { victory, .. } => {
                let mut lines = vec![format!("Moved {}.", direction.name())];
                if victory {
                    lines.push(VICTORY_RESPONSE.to_string());
                }
                lines
            }
            MoveResult::Rejected(reason) => {
                debug!("Move {} rejected: {:?}", direction.name(), reason);
                vec![INVALID_RESPONSE.to_string()]
            }
        },
        Command::FindNearestCoin { with_route } => match game.locate_nearest_coin(*with_route) {
            PathResult::Found(target) => vec![format!("Nearest coin at {}.", target)],
            PathResult::FoundWithRoute(route) => {
                let target = route.last().copied().unwrap_or(game.player_position());
                vec![
                    format!("Nearest coin at {}.", target),
                    format!("Path: {}", format_route(&route)),
                ]
            }
            PathResult::NotFound if game.phase() == Phase::Won => {
                vec![NO_COINS_RESPONSE.to_string()]
            }
            PathResult::NotFound => vec![UNREACHABLE_COINS_RESPONSE.to_string()],
        },
        Command::Reset => {
            game.reset();
            vec![RESET_RESPONSE.to_string()]
        }
        Command::Invalid(raw) => {
            warn!("Invalid command: {:?}", raw);
            vec![INVALID_RESPONSE.to_string()]
        }
    };

    Outcome::Reply(frame(game, &lines))
}

fn format_route(route: &[Position]) -> String {
    route
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn frame(game: &GameState, lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&game.render_snapshot());
    out.push_str(END_MARKER);
    out.push('\n');
    out
}
