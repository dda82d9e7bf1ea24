//! Scoring engine - deterministic conversion from box scores to round totals.
//!
//! Per-player points come from the single formula in `fantasy-core`; a user's
//! round total is the sum over all starters plus the three highest-scoring
//! bench players, evaluated only for complete rosters.

mod engine;
mod scorer;

pub use engine::{RoundScoreSummary, ScoringEngine};
pub use scorer::{chosen_players, counted_players, round_total, ScoringRules};

pub use fantasy_core::calculate_fantasy_points;
