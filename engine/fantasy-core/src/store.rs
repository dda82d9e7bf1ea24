//! Storage seam between the engine and the excluded persistence layer.
//!
//! [`FantasyStore`] is the contract the roster manager and scoring engine
//! operate through; a database-backed implementation lives with the embedder.
//! [`MemoryStore`] is the in-process reference implementation used by tests
//! and by embedders that do not need durability.
//!
//! Implementations surface their own failures as
//! [`crate::error::EngineError::Storage`]; the engine never reinterprets
//! them.

use crate::error::Result;
use crate::stats::PlayerRoundPoints;
use crate::types::{Player, PlayerId, RosterEntry, Round, RoundBudget, UserId, UserRoundScore};
use dashmap::DashMap;
use std::collections::HashMap;

pub trait FantasyStore: Send + Sync {
    fn player(&self, id: PlayerId) -> Result<Option<Player>>;

    fn user_exists(&self, id: UserId) -> Result<bool>;

    /// Active roster entries for (user, round). Entries flagged inactive are
    /// invisible here even if an implementation retains them for audit.
    fn active_entries(&self, user_id: UserId, round: Round) -> Result<Vec<RosterEntry>>;

    fn insert_entry(&self, entry: RosterEntry) -> Result<()>;

    /// Persist a changed entry, keyed by (user, round, player).
    fn update_entry(&self, entry: &RosterEntry) -> Result<()>;

    /// Remove the active entry for the given player. `Ok(false)` when no
    /// such entry exists.
    fn remove_entry(&self, user_id: UserId, round: Round, player_id: PlayerId) -> Result<bool>;

    /// Remove every entry for (user, round), active or not; returns the
    /// number removed.
    fn clear_entries(&self, user_id: UserId, round: Round) -> Result<usize>;

    /// Users holding at least one active entry in the round, ascending.
    fn users_with_entries(&self, round: Round) -> Result<Vec<UserId>>;

    /// Budget record for (user, round), created lazily on first touch.
    fn round_budget(&self, user_id: UserId, round: Round) -> Result<RoundBudget>;

    fn set_round_locked(&self, user_id: UserId, round: Round, locked: bool) -> Result<RoundBudget>;

    /// Derived point records for every player with a box score in the round.
    fn round_points(&self, round: Round) -> Result<HashMap<PlayerId, PlayerRoundPoints>>;

    fn upsert_round_points(&self, record: PlayerRoundPoints) -> Result<()>;

    fn user_round_score(&self, user_id: UserId, round: Round) -> Result<Option<UserRoundScore>>;

    fn upsert_user_round_score(&self, score: UserRoundScore) -> Result<()>;

    /// All of a user's round scores, ascending by round.
    fn user_round_scores(&self, user_id: UserId) -> Result<Vec<UserRoundScore>>;
}

/// In-memory [`FantasyStore`] backed by concurrent keyed maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: DashMap<PlayerId, Player>,
    users: DashMap<UserId, String>,
    entries: DashMap<(UserId, Round), Vec<RosterEntry>>,
    budgets: DashMap<(UserId, Round), RoundBudget>,
    round_points: DashMap<(PlayerId, Round), PlayerRoundPoints>,
    user_scores: DashMap<(UserId, Round), UserRoundScore>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog population, owned by off-engine data entry.
    pub fn add_player(&self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn add_user(&self, id: UserId, name: impl Into<String>) {
        self.users.insert(id, name.into());
    }
}

impl FantasyStore for MemoryStore {
    fn player(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.players.get(&id).map(|p| p.clone()))
    }

    fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.users.contains_key(&id))
    }

    fn active_entries(&self, user_id: UserId, round: Round) -> Result<Vec<RosterEntry>> {
        Ok(self
            .entries
            .get(&(user_id, round))
            .map(|list| list.iter().filter(|e| e.active).cloned().collect())
            .unwrap_or_default())
    }

    fn insert_entry(&self, entry: RosterEntry) -> Result<()> {
        self.entries.entry((entry.user_id, entry.round)).or_default().push(entry);
        Ok(())
    }

    fn update_entry(&self, entry: &RosterEntry) -> Result<()> {
        if let Some(mut list) = self.entries.get_mut(&(entry.user_id, entry.round)) {
            if let Some(slot) =
                list.iter_mut().find(|e| e.player_id == entry.player_id && e.active)
            {
                *slot = entry.clone();
            }
        }
        Ok(())
    }

    fn remove_entry(&self, user_id: UserId, round: Round, player_id: PlayerId) -> Result<bool> {
        let mut removed = false;
        if let Some(mut list) = self.entries.get_mut(&(user_id, round)) {
            let before = list.len();
            list.retain(|e| !(e.player_id == player_id && e.active));
            removed = list.len() != before;
        }
        Ok(removed)
    }

    fn clear_entries(&self, user_id: UserId, round: Round) -> Result<usize> {
        Ok(self.entries.remove(&(user_id, round)).map(|(_, list)| list.len()).unwrap_or(0))
    }

    fn users_with_entries(&self, round: Round) -> Result<Vec<UserId>> {
        let mut users: Vec<UserId> = self
            .entries
            .iter()
            .filter(|kv| kv.key().1 == round && kv.value().iter().any(|e| e.active))
            .map(|kv| kv.key().0)
            .collect();
        users.sort_unstable();
        users.dedup();
        Ok(users)
    }

    fn round_budget(&self, user_id: UserId, round: Round) -> Result<RoundBudget> {
        Ok(self
            .budgets
            .entry((user_id, round))
            .or_insert_with(|| RoundBudget::new(user_id, round))
            .clone())
    }

    fn set_round_locked(&self, user_id: UserId, round: Round, locked: bool) -> Result<RoundBudget> {
        let mut budget = self
            .budgets
            .entry((user_id, round))
            .or_insert_with(|| RoundBudget::new(user_id, round));
        budget.locked = locked;
        Ok(budget.clone())
    }

    fn round_points(&self, round: Round) -> Result<HashMap<PlayerId, PlayerRoundPoints>> {
        Ok(self
            .round_points
            .iter()
            .filter(|kv| kv.key().1 == round)
            .map(|kv| (kv.key().0, kv.value().clone()))
            .collect())
    }

    fn upsert_round_points(&self, record: PlayerRoundPoints) -> Result<()> {
        self.round_points.insert((record.player_id, record.round), record);
        Ok(())
    }

    fn user_round_score(&self, user_id: UserId, round: Round) -> Result<Option<UserRoundScore>> {
        Ok(self.user_scores.get(&(user_id, round)).map(|s| s.clone()))
    }

    fn upsert_user_round_score(&self, score: UserRoundScore) -> Result<()> {
        self.user_scores.insert((score.user_id, score.round), score);
        Ok(())
    }

    fn user_round_scores(&self, user_id: UserId) -> Result<Vec<UserRoundScore>> {
        let mut scores: Vec<UserRoundScore> = self
            .user_scores
            .iter()
            .filter(|kv| kv.key().0 == user_id)
            .map(|kv| kv.value().clone())
            .collect();
        scores.sort_unstable_by_key(|s| s.round);
        Ok(scores)
    }
}
