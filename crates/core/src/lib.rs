//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the complete board engine: tile movement, merging,
//! spawning, undo, and terminal-state detection. It has **zero dependencies**
//! on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every transition is a synchronous, total function
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`board`]: the 4x4 grid transition function and terminal-state checks
//! - [`tile`]: identity-bearing tiles with transient spawn/merge flags
//! - [`rng`]: seedable LCG used for tile spawning
//! - [`snapshot`]: read-only board view for presentation layers
//!
//! # Game Rules
//!
//! - Each move compacts every line toward the chosen edge and merges each
//!   adjacent equal pair exactly once (a merge result never re-merges in the
//!   same pass)
//! - A move that changes nothing is a no-op: no spawn, no history push
//! - Every real move spawns one tile on a random empty cell (2 at 90%, 4 at
//!   10%) and captures the pre-move state into a single-slot undo history
//! - The game is over when the board is full and no equal-valued neighbors
//!   remain; reaching the 2048 tile marks the game won without halting it
//!
//! # Example
//!
//! ```
//! use lux_2048_core::BoardState;
//! use lux_2048_types::Direction;
//!
//! let mut board = BoardState::new(12345);
//! let outcome = board.apply_move(Direction::Left);
//! if outcome.moved {
//!     println!("score is now {}", board.score());
//! }
//! ```

pub mod board;
pub mod rng;
pub mod snapshot;
pub mod tile;

pub use lux_2048_types as types;

// Re-export commonly used types for convenience
pub use board::{BoardState, MoveOutcome};
pub use rng::SimpleRng;
pub use snapshot::BoardSnapshot;
pub use tile::{Tile, TileId};
