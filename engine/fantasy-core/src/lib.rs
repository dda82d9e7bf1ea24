//! Shared data model for the fantasy roster & scoring engine.
//!
//! This crate owns the types that cross the engine boundary (players, roster
//! entries, box scores, round budgets, user round scores), the single
//! authoritative fantasy-point formula, the error taxonomy, and the storage
//! seam the roster manager and scoring engine operate through.

pub mod error;
pub mod round;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{EngineError, ErrorKind, Result};
pub use round::{CurrentRoundProvider, SharedCurrentRound};
pub use stats::{calculate_fantasy_points, BoxScoreStats, PlayerRoundPoints};
pub use store::{FantasyStore, MemoryStore};
pub use types::{
    CourtSide, Player, PlayerId, Position, RosterEntry, Round, RoundBudget, TeamId, UserId,
    UserRoundScore,
};
