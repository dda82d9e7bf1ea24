//! Pure round-scoring rules, shared by the batch recompute and the
//! display-facing "chosen" annotation so the two can never disagree.

use fantasy_core::types::{PlayerId, RosterEntry};
use fantasy_core::{EngineError, Result};
use std::collections::{HashMap, HashSet};

/// Parameters of the starters-plus-top-bench rule.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRules {
    /// A roster is scored only when it holds exactly this many active
    /// entries.
    pub roster_size: usize,
    /// Bench players whose points count, taken from the top by fantasy
    /// points.
    pub counted_bench: usize,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self { roster_size: 10, counted_bench: 3 }
    }
}

impl ScoringRules {
    pub fn validate(&self) -> Result<()> {
        if self.roster_size == 0 {
            return Err(EngineError::InvalidRules("roster_size must be positive"));
        }
        if self.counted_bench > self.roster_size {
            return Err(EngineError::InvalidRules("counted_bench exceeds roster_size"));
        }
        Ok(())
    }
}

fn points_of(points: &HashMap<PlayerId, i32>, player_id: PlayerId) -> i32 {
    // a missing box score is an expected transient state, scored as zero
    points.get(&player_id).copied().unwrap_or(0)
}

/// Players whose points count toward the round total: every starter, plus
/// the top `counted_bench` bench players ranked by fantasy points descending
/// with ties broken by ascending player id.
pub fn counted_players(
    entries: &[RosterEntry],
    points: &HashMap<PlayerId, i32>,
    rules: &ScoringRules,
) -> HashSet<PlayerId> {
    let mut counted: HashSet<PlayerId> = entries
        .iter()
        .filter(|e| e.on_court)
        .map(|e| e.player_id)
        .collect();

    let mut bench: Vec<(PlayerId, i32)> = entries
        .iter()
        .filter(|e| !e.on_court)
        .map(|e| (e.player_id, points_of(points, e.player_id)))
        .collect();
    bench.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counted.extend(bench.into_iter().take(rules.counted_bench).map(|(id, _)| id));

    counted
}

/// Round total for one user's entries under the given per-player points.
pub fn round_total(
    entries: &[RosterEntry],
    points: &HashMap<PlayerId, i32>,
    rules: &ScoringRules,
) -> i32 {
    counted_players(entries, points, rules)
        .into_iter()
        .map(|id| points_of(points, id))
        .sum()
}

/// Display annotation: each roster player with a flag saying whether their
/// points counted toward the round total. An incomplete roster contributes
/// nothing, so all of its players are marked not chosen.
pub fn chosen_players(
    entries: &[RosterEntry],
    points: &HashMap<PlayerId, i32>,
    rules: &ScoringRules,
) -> Vec<(PlayerId, bool)> {
    let counted = if entries.len() == rules.roster_size {
        counted_players(entries, points, rules)
    } else {
        HashSet::new()
    };
    let mut chosen: Vec<(PlayerId, bool)> = entries
        .iter()
        .map(|e| (e.player_id, counted.contains(&e.player_id)))
        .collect();
    chosen.sort_unstable_by_key(|(id, _)| *id);
    chosen
}
