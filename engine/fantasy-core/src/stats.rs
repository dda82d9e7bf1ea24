//! Box-score statistics and the fantasy-point formula.

use crate::types::{PlayerId, Round};
use serde::{Deserialize, Serialize};

/// Raw per-game statistics for one player in one round.
///
/// These are the only trusted inputs to scoring; derived point values are
/// always recomputed from them, never accepted from outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxScoreStats {
    pub points: i32,
    pub rebounds: i32,
    pub assists: i32,
    pub steals: i32,
    pub blocks: i32,
    pub turnovers: i32,
    pub team_win: bool,
}

/// The single authoritative fantasy-point formula.
///
/// `points + rebounds + assists + 2*steals + 2*blocks - turnovers`, plus 5
/// when the player's team won or minus 3 when it lost. Integer arithmetic,
/// no rounding. Every code path that produces a per-player point value must
/// route through here.
pub fn calculate_fantasy_points(stats: &BoxScoreStats) -> i32 {
    let base = stats.points + stats.rebounds + stats.assists + 2 * stats.steals
        + 2 * stats.blocks
        - stats.turnovers;
    if stats.team_win {
        base + 5
    } else {
        base - 3
    }
}

/// Derived per-(player, round) point record.
///
/// The `fantasy_points` field is private and set only from the raw stats at
/// construction or when the stats are rewritten, so the stored value can
/// never drift from the formula. Deserialization recomputes it as well; a
/// supplied value is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRoundPoints {
    pub player_id: PlayerId,
    pub round: Round,
    pub stats: BoxScoreStats,
    fantasy_points: i32,
}

impl PlayerRoundPoints {
    pub fn new(player_id: PlayerId, round: Round, stats: BoxScoreStats) -> Self {
        Self { player_id, round, stats, fantasy_points: calculate_fantasy_points(&stats) }
    }

    pub fn fantasy_points(&self) -> i32 {
        self.fantasy_points
    }

    /// Replace the raw stats, recomputing the derived value.
    pub fn set_stats(&mut self, stats: BoxScoreStats) {
        self.stats = stats;
        self.fantasy_points = calculate_fantasy_points(&stats);
    }
}

impl<'de> Deserialize<'de> for PlayerRoundPoints {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            player_id: PlayerId,
            round: Round,
            stats: BoxScoreStats,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(PlayerRoundPoints::new(raw.player_id, raw.round, raw.stats))
    }
}
