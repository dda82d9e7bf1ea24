use crate::scorer::{chosen_players, round_total, ScoringRules};
use fantasy_core::types::{PlayerId, Round, UserId, UserRoundScore};
use fantasy_core::{BoxScoreStats, EngineError, FantasyStore, PlayerRoundPoints, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one batch recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScoreSummary {
    pub round: Round,
    pub users_scored: usize,
    /// Users holding an incomplete roster, skipped without writing a score.
    pub users_skipped: usize,
}

/// Computes per-player fantasy points and per-user round totals against a
/// [`FantasyStore`].
///
/// Must not run concurrently with roster mutations for the round being
/// scored; the coordinator locks rosters first (see the round budget's
/// `locked` flag).
pub struct ScoringEngine<S: FantasyStore> {
    store: Arc<S>,
    rules: ScoringRules,
}

impl<S: FantasyStore> ScoringEngine<S> {
    pub fn new(store: Arc<S>, rules: ScoringRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { store, rules })
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Record (or rewrite) a player's raw box score for a round. The derived
    /// fantasy points are recomputed here on every write; they are never
    /// accepted as input.
    pub fn record_box_score(
        &self,
        player_id: PlayerId,
        round: Round,
        stats: BoxScoreStats,
    ) -> Result<PlayerRoundPoints> {
        if self.store.player(player_id)?.is_none() {
            return Err(EngineError::PlayerNotFound(player_id));
        }
        let record = PlayerRoundPoints::new(player_id, round, stats);
        self.store.upsert_round_points(record.clone())?;
        debug!(player_id, round, fantasy_points = record.fantasy_points(), "recorded box score");
        Ok(record)
    }

    /// Recompute every user's total for the round and upsert the results.
    ///
    /// Users with exactly `roster_size` active entries get a full overwrite
    /// of their `UserRoundScore`; everyone else is skipped without a write,
    /// so rerunning on unchanged data is idempotent. This is the only code
    /// path that writes user-level totals.
    pub fn calculate_round_scores(&self, round: Round) -> Result<RoundScoreSummary> {
        let points = self.load_points(round)?;
        let users = self.store.users_with_entries(round)?;

        let mut summary = RoundScoreSummary { round, users_scored: 0, users_skipped: 0 };
        for user_id in users {
            let entries = self.store.active_entries(user_id, round)?;
            if entries.len() != self.rules.roster_size {
                debug!(user_id, round, entries = entries.len(), "incomplete roster, skipped");
                summary.users_skipped += 1;
                continue;
            }
            let total = round_total(&entries, &points, &self.rules);
            self.store.upsert_user_round_score(UserRoundScore::new(user_id, round, total))?;
            debug!(user_id, round, total, "round score written");
            summary.users_scored += 1;
        }
        info!(
            round,
            scored = summary.users_scored,
            skipped = summary.users_skipped,
            "round scores recomputed"
        );
        Ok(summary)
    }

    /// Per-player "counted toward the total" flags for one user's round,
    /// using the same selection as [`Self::calculate_round_scores`].
    pub fn chosen_for_round(&self, user_id: UserId, round: Round) -> Result<Vec<(PlayerId, bool)>> {
        if !self.store.user_exists(user_id)? {
            return Err(EngineError::UserNotFound(user_id));
        }
        let points = self.load_points(round)?;
        let entries = self.store.active_entries(user_id, round)?;
        Ok(chosen_players(&entries, &points, &self.rules))
    }

    /// Sum of the user's round scores across the whole season.
    pub fn season_total(&self, user_id: UserId) -> Result<i32> {
        if !self.store.user_exists(user_id)? {
            return Err(EngineError::UserNotFound(user_id));
        }
        Ok(self.store.user_round_scores(user_id)?.iter().map(|s| s.points).sum())
    }

    fn load_points(&self, round: Round) -> Result<HashMap<PlayerId, i32>> {
        Ok(self
            .store
            .round_points(round)?
            .into_iter()
            .map(|(id, record)| (id, record.fantasy_points()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantasy_core::types::{Player, Position, RosterEntry};
    use fantasy_core::MemoryStore;

    fn stats(points: i32, team_win: bool) -> BoxScoreStats {
        BoxScoreStats { points, team_win, ..Default::default() }
    }

    // User 1: full 10-player roster, 5 starters and 5 bench.
    // User 2: 9 entries only.
    fn seed() -> (ScoringEngine<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.add_user(1, "alice");
        store.add_user(2, "bob");
        for id in 1..=10 {
            store.add_player(Player::new(id, 1, format!("p{id}"), Position::PG, 10));
            store
                .insert_entry(RosterEntry::new(1, id, 1, id <= 5))
                .unwrap();
            if id <= 9 {
                store.insert_entry(RosterEntry::new(2, id, 1, id <= 5)).unwrap();
            }
        }
        let engine = ScoringEngine::new(store.clone(), ScoringRules::default()).unwrap();
        (engine, store)
    }

    // Starter points 10, 8, 6, 4, 2 and bench points 20, 15, 1, 1, 1, all
    // as losses so raw points - 3 lands on the target values.
    fn enter_scores(engine: &ScoringEngine<MemoryStore>) {
        let values = [10, 8, 6, 4, 2, 20, 15, 1, 1, 1];
        for (i, v) in values.iter().enumerate() {
            engine.record_box_score(i as PlayerId + 1, 1, stats(v + 3, false)).unwrap();
        }
    }

    #[test]
    fn record_box_score_derives_points() {
        let (engine, store) = seed();
        let record = engine.record_box_score(1, 1, stats(10, true)).unwrap();
        assert_eq!(record.fantasy_points(), 15);
        // rewriting the raw stats recomputes the stored value
        engine.record_box_score(1, 1, stats(10, false)).unwrap();
        assert_eq!(store.round_points(1).unwrap()[&1].fantasy_points(), 7);
    }

    #[test]
    fn record_box_score_requires_known_player() {
        let (engine, _) = seed();
        assert_eq!(
            engine.record_box_score(99, 1, stats(1, true)),
            Err(EngineError::PlayerNotFound(99))
        );
    }

    #[test]
    fn complete_roster_scores_incomplete_skipped() {
        let (engine, store) = seed();
        enter_scores(&engine);
        let summary = engine.calculate_round_scores(1).unwrap();
        assert_eq!(summary, RoundScoreSummary { round: 1, users_scored: 1, users_skipped: 1 });
        assert_eq!(store.user_round_score(1, 1).unwrap().unwrap().points, 66);
        assert!(store.user_round_score(2, 1).unwrap().is_none());
    }

    #[test]
    fn recompute_is_idempotent() {
        let (engine, store) = seed();
        enter_scores(&engine);
        engine.calculate_round_scores(1).unwrap();
        let first = store.user_round_score(1, 1).unwrap().unwrap().points;
        engine.calculate_round_scores(1).unwrap();
        let second = store.user_round_score(1, 1).unwrap().unwrap().points;
        assert_eq!(first, second);
    }

    #[test]
    fn recompute_overwrites_after_stat_corrections() {
        let (engine, store) = seed();
        enter_scores(&engine);
        engine.calculate_round_scores(1).unwrap();
        // starter 1's game is corrected to a win: 10 + 3 raw becomes +5
        // instead of -3, an 8 point swing
        engine.record_box_score(1, 1, stats(13, true)).unwrap();
        engine.calculate_round_scores(1).unwrap();
        assert_eq!(store.user_round_score(1, 1).unwrap().unwrap().points, 74);
    }

    #[test]
    fn scoring_without_box_scores_writes_zero() {
        let (engine, store) = seed();
        let summary = engine.calculate_round_scores(1).unwrap();
        assert_eq!(summary.users_scored, 1);
        assert_eq!(store.user_round_score(1, 1).unwrap().unwrap().points, 0);
    }

    #[test]
    fn chosen_marks_starters_and_top_bench() {
        let (engine, _) = seed();
        enter_scores(&engine);
        let chosen: HashMap<PlayerId, bool> =
            engine.chosen_for_round(1, 1).unwrap().into_iter().collect();
        for id in 1..=7 {
            assert!(chosen[&id], "player {id} should be chosen");
        }
        // bench players 8, 9, 10 all scored 1; id 8 wins the tie-break for
        // the third bench spot
        assert!(chosen[&8]);
        assert!(!chosen[&9] && !chosen[&10]);
    }

    #[test]
    fn chosen_for_incomplete_roster_is_all_false() {
        let (engine, _) = seed();
        enter_scores(&engine);
        let chosen = engine.chosen_for_round(2, 1).unwrap();
        assert_eq!(chosen.len(), 9);
        assert!(chosen.iter().all(|(_, flag)| !flag));
    }

    #[test]
    fn season_total_sums_rounds() {
        let (engine, store) = seed();
        store.upsert_user_round_score(UserRoundScore::new(1, 1, 40)).unwrap();
        store.upsert_user_round_score(UserRoundScore::new(1, 2, 25)).unwrap();
        assert_eq!(engine.season_total(1).unwrap(), 65);
        assert_eq!(engine.season_total(2).unwrap(), 0);
        assert_eq!(engine.season_total(99), Err(EngineError::UserNotFound(99)));
    }
}
