//! # Maze Client Library
//!
//! Terminal client for the coin maze server. The protocol is plain text:
//! the client sends one command per line and the server answers with a frame
//! of lines (result, player position, coin count, maze rows) closed by an
//! `<END>` line. The client does no game logic of its own; it only frames
//! the stream and forwards what the user types.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Interprets typed lines: local commands (`help`, `quit`), lowercase
//! movement shortcuts, and pass-through of everything else.
//!
//! ### Network Module (`network`)
//! TCP connection handling and frame reading. [`network::read_frame`] works
//! on any buffered async reader, which the integration tests reuse.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("127.0.0.1:12345").await?;
//!     let maze = client.next_frame().await?;
//!     println!("{:?}", maze);
//!
//!     client.send_line("find").await?;
//!     println!("{:?}", client.next_frame().await?);
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
