//! # Maze Server Library
//!
//! Authoritative server for the text-protocol coin maze. Clients connect over
//! TCP, receive an ASCII snapshot of the maze and send one command per line
//! (`W`/`A`/`S`/`D` to move, `find`/`path` to locate the nearest coin,
//! `reset`, `kill`). Every reply is the command result followed by a fresh
//! snapshot and an `<END>` line.
//!
//! ## Module Organization
//!
//! ### Grid (`grid`) and Layout (`layout`)
//! The passive cell store and the parser that validates starting mazes.
//!
//! ### Pathfinder (`pathfinder`)
//! Breadth-first search for the nearest coin and for the shortest route to
//! a target, with a fixed up/down/left/right exploration order so results
//! are reproducible.
//!
//! ### Game (`game`)
//! [`game::GameState`] owns the grid, the player position and the coin
//! counter. It is the only place cells change, and it keeps these invariants:
//! - exactly one player cell, matching the player position
//! - the coin counter equals the number of coin cells
//! - a rejected move changes nothing
//!
//! ### Session (`session`)
//! Maps a decoded command to a game call and renders the reply frame.
//!
//! ### Client Manager (`client_manager`)
//! Connection roster with a capacity limit.
//!
//! ### Network (`network`)
//! The accept loop, one task per connection, and cooperative shutdown. The
//! game lives behind a single mutex (or one per connection in isolated mode)
//! and each command is applied and rendered under that lock.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::layout::MazeLayout;
//! use server::network::{Server, ServerConfig, WorldMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         addr: "127.0.0.1:12345".to_string(),
//!         max_clients: 32,
//!         world: WorldMode::Shared,
//!         trail: false,
//!         layout: MazeLayout::reference()?,
//!     };
//!
//!     // Runs until a client sends `kill` or the shutdown signal fires
//!     let server = Server::bind(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod grid;
pub mod layout;
pub mod network;
pub mod pathfinder;
pub mod session;
