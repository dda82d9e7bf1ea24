//! Error taxonomy for the roster manager and scoring engine.
//!
//! Variants carry enough structured detail (current value, limit, offending
//! player or slot) for callers to build precise user-facing messages without
//! parsing the display text. [`EngineError::kind`] classifies each variant
//! for transport-agnostic mapping by the excluded web layer.

use crate::types::{CourtSide, PlayerId, Position, Round, UserId};
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Transport-agnostic classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Referenced user, player, entry, or slot occupant does not exist.
    NotFound,
    /// A roster-construction invariant would be violated.
    Conflict,
    /// Malformed request data, e.g. an unknown position code.
    InvalidInput,
    /// Opaque failure in the backing store, surfaced untouched.
    Storage,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {player_id} is not in the roster for round {round}")]
    EntryNotFound { player_id: PlayerId, round: Round },

    #[error("no player at {position} on {side}")]
    SlotEmpty { position: Position, side: CourtSide },

    #[error("player {0} is already in the roster")]
    DuplicatePlayer(PlayerId),

    #[error("roster is full: {count} of {max} players selected")]
    RosterFull { count: usize, max: usize },

    #[error("already {count} players at {position}, maximum {max} per position")]
    PositionFull { position: Position, count: usize, max: usize },

    #[error("budget exceeded: used {used} + player cost {cost} over limit {limit}")]
    BudgetExceeded { used: u32, cost: u32, limit: u32 },

    #[error("roster for round {round} is locked")]
    RosterLocked { round: Round },

    #[error("unknown position code: {0}")]
    InvalidPosition(String),

    #[error("invalid rules: {0}")]
    InvalidRules(&'static str),

    #[error("storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UserNotFound(_)
            | EngineError::PlayerNotFound(_)
            | EngineError::EntryNotFound { .. }
            | EngineError::SlotEmpty { .. } => ErrorKind::NotFound,
            EngineError::DuplicatePlayer(_)
            | EngineError::RosterFull { .. }
            | EngineError::PositionFull { .. }
            | EngineError::BudgetExceeded { .. }
            | EngineError::RosterLocked { .. } => ErrorKind::Conflict,
            EngineError::InvalidPosition(_) | EngineError::InvalidRules(_) => {
                ErrorKind::InvalidInput
            }
            EngineError::Storage(_) => ErrorKind::Storage,
        }
    }
}
