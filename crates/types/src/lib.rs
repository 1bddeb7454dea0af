//! Core types shared across the application
//! This module contains pure data types with no external dependencies

/// Board dimension (the grid is GRID_SIZE x GRID_SIZE)
pub const GRID_SIZE: usize = 4;

/// Tile value that marks the game as won
pub const TARGET_TILE: u32 = 2048;

/// A spawned tile is worth 2 in SPAWN_TWO_IN_TEN out of 10 draws, else 4
pub const SPAWN_TWO_IN_TEN: u32 = 9;

/// Multiplayer timing constants (in milliseconds)
pub const COUNTDOWN_MS: u64 = 3000;
pub const HEARTBEAT_INTERVAL_MS: u64 = 5000;

/// Move directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse direction from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Get all four directions
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Lines run over columns for vertical moves, over rows otherwise
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Moves toward the far edge process each line in reverse order
    pub fn toward_far_edge(&self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

/// Multiplayer session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No active session
    Idle,
    /// Joiner sent a connect attempt, awaiting channel establishment
    Searching,
    /// Channel established, both sides await mutual readiness
    Waiting,
    /// Both ready; a fixed local timer runs before play starts
    Countdown,
    /// Match in progress
    Playing,
    /// Terminal; reports the outcome until reset
    Ended,
}

impl SessionStatus {
    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Searching => "searching",
            SessionStatus::Waiting => "waiting",
            SessionStatus::Countdown => "countdown",
            SessionStatus::Playing => "playing",
            SessionStatus::Ended => "ended",
        }
    }
}

/// Match outcome from the local player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winner {
    Local,
    Opponent,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Local => "local",
            Winner::Opponent => "opponent",
        }
    }
}
