use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = u32;
pub type PlayerId = u32;
pub type TeamId = u32;
pub type Round = u32;

/// Fixed per-round spending cap on summed player costs.
pub const DEFAULT_BUDGET: u32 = 100;

/// Basketball position a player is listed at.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PG,
        Position::SG,
        Position::SF,
        Position::PF,
        Position::C,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PG" => Ok(Position::PG),
            "SG" => Ok(Position::SG),
            "SF" => Ok(Position::SF),
            "PF" => Ok(Position::PF),
            "C" => Ok(Position::C),
            other => Err(EngineError::InvalidPosition(other.to_string())),
        }
    }
}

/// Which side of the court/bench split a roster entry sits on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CourtSide {
    Court,
    Bench,
}

impl CourtSide {
    pub fn is_court(&self) -> bool {
        matches!(self, CourtSide::Court)
    }

    pub fn opposite(&self) -> CourtSide {
        match self {
            CourtSide::Court => CourtSide::Bench,
            CourtSide::Bench => CourtSide::Court,
        }
    }

    pub fn from_on_court(on_court: bool) -> CourtSide {
        if on_court {
            CourtSide::Court
        } else {
            CourtSide::Bench
        }
    }
}

impl fmt::Display for CourtSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourtSide::Court => f.write_str("court"),
            CourtSide::Bench => f.write_str("bench"),
        }
    }
}

/// Catalog record for a real player, immutable within a round.
///
/// `total_points` is the player's cumulative season score; it is shown to
/// users picking a roster but never feeds the engine's decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub position: Position,
    pub cost: u32,
    pub total_points: i32,
}

impl Player {
    pub fn new(id: PlayerId, team_id: TeamId, name: impl Into<String>, position: Position, cost: u32) -> Self {
        Self { id, team_id, name: name.into(), position, cost, total_points: 0 }
    }
}

/// One player's membership in a user's roster for one round.
///
/// At most one active entry may exist per (user, round, player). Inactive
/// entries are logically removed but may be retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub player_id: PlayerId,
    pub round: Round,
    pub active: bool,
    pub on_court: bool,
    pub added_at: DateTime<Utc>,
}

impl RosterEntry {
    pub fn new(user_id: UserId, player_id: PlayerId, round: Round, on_court: bool) -> Self {
        Self { user_id, player_id, round, active: true, on_court, added_at: Utc::now() }
    }

    pub fn side(&self) -> CourtSide {
        CourtSide::from_on_court(self.on_court)
    }
}

/// Per-(user, round) budget record, created lazily on first touch of a round.
///
/// Used budget is always recomputed from active entries rather than stored
/// here. `locked` freezes the roster once a round moves into scoring; every
/// mutation checks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundBudget {
    pub user_id: UserId,
    pub round: Round,
    pub total_budget: u32,
    pub locked: bool,
}

impl RoundBudget {
    pub fn new(user_id: UserId, round: Round) -> Self {
        Self { user_id, round, total_budget: DEFAULT_BUDGET, locked: false }
    }
}

/// A user's total points for one round, written only by the scoring engine's
/// batch recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoundScore {
    pub user_id: UserId,
    pub round: Round,
    pub points: i32,
    pub last_updated: DateTime<Utc>,
}

impl UserRoundScore {
    pub fn new(user_id: UserId, round: Round, points: i32) -> Self {
        Self { user_id, round, points, last_updated: Utc::now() }
    }
}
