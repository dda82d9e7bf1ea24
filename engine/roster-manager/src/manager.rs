use crate::config::RosterRules;
use crate::slots::{Slot, SlotGrid};
use crate::status::{MoveAction, MoveOutcome, RosterPlayer, RosterStatus};
use dashmap::DashMap;
use fantasy_core::types::{PlayerId, Round, RosterEntry, UserId};
use fantasy_core::{EngineError, FantasyStore, Player, Result};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Validates and applies roster mutations for one store.
///
/// Mutations take an explicit round; callers resolve it once from a
/// [`fantasy_core::CurrentRoundProvider`] so historical rounds are never
/// edited by accident, and the per-round `locked` flag rejects edits once a
/// round has moved into scoring.
pub struct RosterManager<S: FantasyStore> {
    store: Arc<S>,
    rules: RosterRules,
    locks: DashMap<(UserId, Round), Arc<Mutex<()>>>,
}

impl<S: FantasyStore> RosterManager<S> {
    pub fn new(store: Arc<S>, rules: RosterRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { store, rules, locks: DashMap::new() })
    }

    pub fn rules(&self) -> &RosterRules {
        &self.rules
    }

    /// Add a player to the user's roster for the round.
    ///
    /// Invariants are checked in a fixed order - uniqueness, size, position
    /// cap, budget - and the first violation is the one reported. The new
    /// player goes on court iff no on-court entry already holds its
    /// position, otherwise to the bench.
    pub fn add_player(&self, user_id: UserId, round: Round, player_id: PlayerId) -> Result<RosterStatus> {
        self.require_user(user_id)?;
        let player = self
            .store
            .player(player_id)?
            .ok_or(EngineError::PlayerNotFound(player_id))?;

        let guard = self.mutation_guard(user_id, round);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_unlocked(user_id, round)?;
        let mut roster = self.load_roster(user_id, round)?;

        if roster.iter().any(|(e, _)| e.player_id == player.id) {
            return Err(EngineError::DuplicatePlayer(player.id));
        }
        if roster.len() >= self.rules.max_players {
            return Err(EngineError::RosterFull { count: roster.len(), max: self.rules.max_players });
        }
        let at_position =
            roster.iter().filter(|(_, p)| p.position == player.position).count();
        if at_position >= self.rules.max_per_position {
            return Err(EngineError::PositionFull {
                position: player.position,
                count: at_position,
                max: self.rules.max_per_position,
            });
        }
        let used: u32 = roster.iter().map(|(_, p)| p.cost).sum();
        // checked: a catalog cost near u32::MAX must reject, not wrap
        let over = used
            .checked_add(player.cost)
            .map_or(true, |total| total > self.rules.budget_limit);
        if over {
            return Err(EngineError::BudgetExceeded {
                used,
                cost: player.cost,
                limit: self.rules.budget_limit,
            });
        }

        let on_court = !roster
            .iter()
            .any(|(e, p)| p.position == player.position && e.on_court);
        let entry = RosterEntry::new(user_id, player.id, round, on_court);
        self.store.insert_entry(entry.clone())?;
        info!(user_id, round, player_id = player.id, on_court, "added player to roster");

        roster.push((entry, player));
        self.build_status(user_id, round, roster)
    }

    /// Remove the player's active entry for the round.
    pub fn remove_player(&self, user_id: UserId, round: Round, player_id: PlayerId) -> Result<RosterStatus> {
        self.require_user(user_id)?;

        let guard = self.mutation_guard(user_id, round);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_unlocked(user_id, round)?;
        if !self.store.remove_entry(user_id, round, player_id)? {
            return Err(EngineError::EntryNotFound { player_id, round });
        }
        info!(user_id, round, player_id, "removed player from roster");

        let roster = self.load_roster(user_id, round)?;
        self.build_status(user_id, round, roster)
    }

    /// Delete every roster entry for (user, round), active or not.
    /// Idempotent: clearing an empty roster returns 0.
    pub fn clear_roster(&self, user_id: UserId, round: Round) -> Result<usize> {
        self.require_user(user_id)?;

        let guard = self.mutation_guard(user_id, round);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_unlocked(user_id, round)?;
        let removed = self.store.clear_entries(user_id, round)?;
        info!(user_id, round, removed, "cleared roster");
        Ok(removed)
    }

    /// Read-only roster projection with recomputed budget figures.
    pub fn roster_status(&self, user_id: UserId, round: Round) -> Result<RosterStatus> {
        self.require_user(user_id)?;
        let roster = self.load_roster(user_id, round)?;
        self.build_status(user_id, round, roster)
    }

    /// Move the occupant of `from` into `to` when the target slot is empty,
    /// or swap the two occupants' court/bench sides when it is not.
    ///
    /// Only on-court flags change; roster size, cost, and position counts
    /// are untouched, so the construction invariants hold by design.
    pub fn move_or_swap(&self, user_id: UserId, round: Round, from: Slot, to: Slot) -> Result<MoveOutcome> {
        self.require_user(user_id)?;

        let guard = self.mutation_guard(user_id, round);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.require_unlocked(user_id, round)?;
        let roster = self.load_roster(user_id, round)?;
        let grid = SlotGrid::build(&roster);

        let source_id = grid
            .occupant(from)
            .ok_or(EngineError::SlotEmpty { position: from.position, side: from.side })?;

        match grid.occupant(to) {
            None => {
                let mut entry = self.entry_of(&roster, source_id)?;
                entry.on_court = to.side.is_court();
                self.store.update_entry(&entry)?;
                info!(user_id, round, player_id = source_id, %from, %to, "moved player");
                Ok(MoveOutcome {
                    action: MoveAction::Moved,
                    from,
                    to,
                    moved_player: source_id,
                    displaced_player: None,
                })
            }
            Some(target_id) if target_id == source_id => {
                // from == to resolves to the same entry; nothing to write
                Ok(MoveOutcome {
                    action: MoveAction::Moved,
                    from,
                    to,
                    moved_player: source_id,
                    displaced_player: None,
                })
            }
            Some(target_id) => {
                let mut source = self.entry_of(&roster, source_id)?;
                let mut target = self.entry_of(&roster, target_id)?;
                std::mem::swap(&mut source.on_court, &mut target.on_court);
                self.store.update_entry(&source)?;
                self.store.update_entry(&target)?;
                info!(
                    user_id,
                    round,
                    player_id = source_id,
                    displaced = target_id,
                    %from,
                    %to,
                    "swapped players"
                );
                Ok(MoveOutcome {
                    action: MoveAction::Swapped,
                    from,
                    to,
                    moved_player: source_id,
                    displaced_player: Some(target_id),
                })
            }
        }
    }

    /// Freeze or unfreeze the user's roster for the round. Scoring a round
    /// and editing it are mutually exclusive phases; the coordinator flips
    /// this before running the batch recompute.
    pub fn set_locked(&self, user_id: UserId, round: Round, locked: bool) -> Result<()> {
        self.require_user(user_id)?;

        // serialized with the mutations it excludes, so a lock flip cannot
        // land between another call's lock check and its write
        let guard = self.mutation_guard(user_id, round);
        let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.store.set_round_locked(user_id, round, locked)?;
        info!(user_id, round, locked, "changed roster lock");
        Ok(())
    }

    fn mutation_guard(&self, user_id: UserId, round: Round) -> Arc<Mutex<()>> {
        self.locks
            .entry((user_id, round))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn require_user(&self, user_id: UserId) -> Result<()> {
        if self.store.user_exists(user_id)? {
            Ok(())
        } else {
            Err(EngineError::UserNotFound(user_id))
        }
    }

    fn require_unlocked(&self, user_id: UserId, round: Round) -> Result<()> {
        let budget = self.store.round_budget(user_id, round)?;
        if budget.locked {
            return Err(EngineError::RosterLocked { round });
        }
        Ok(())
    }

    fn load_roster(&self, user_id: UserId, round: Round) -> Result<Vec<(RosterEntry, Player)>> {
        let entries = self.store.active_entries(user_id, round)?;
        let mut roster = Vec::with_capacity(entries.len());
        for entry in entries {
            let player = self.store.player(entry.player_id)?.ok_or_else(|| {
                EngineError::Storage(format!(
                    "roster entry references missing player {}",
                    entry.player_id
                ))
            })?;
            roster.push((entry, player));
        }
        Ok(roster)
    }

    fn entry_of(&self, roster: &[(RosterEntry, Player)], player_id: PlayerId) -> Result<RosterEntry> {
        roster
            .iter()
            .find(|(e, _)| e.player_id == player_id)
            .map(|(e, _)| e.clone())
            .ok_or_else(|| {
                EngineError::Storage(format!("slot occupant {player_id} missing from roster"))
            })
    }

    fn build_status(
        &self,
        user_id: UserId,
        round: Round,
        roster: Vec<(RosterEntry, Player)>,
    ) -> Result<RosterStatus> {
        let budget = self.store.round_budget(user_id, round)?;
        let used: u32 = roster.iter().map(|(_, p)| p.cost).sum();
        let players = roster
            .into_iter()
            .map(|(entry, player)| RosterPlayer {
                player_id: player.id,
                name: player.name,
                position: player.position,
                team_id: player.team_id,
                cost: player.cost,
                total_points: player.total_points,
                on_court: entry.on_court,
            })
            .collect::<Vec<_>>();
        Ok(RosterStatus {
            round,
            total_budget: self.rules.budget_limit,
            used_budget: used,
            remaining_budget: self.rules.budget_limit.saturating_sub(used),
            selected_count: players.len(),
            max_players: self.rules.max_players,
            locked: budget.locked,
            players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantasy_core::types::{CourtSide, Position};
    use fantasy_core::{ErrorKind, MemoryStore};

    // Two players per position at cost 10 (ids 1-10), a third PG (11), and
    // an expensive center (12).
    fn seed() -> (RosterManager<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let positions = [
            Position::PG,
            Position::SG,
            Position::SF,
            Position::PF,
            Position::C,
        ];
        for (i, pos) in positions.iter().enumerate() {
            let base = (i * 2) as PlayerId;
            store.add_player(Player::new(base + 1, 1, format!("p{}", base + 1), *pos, 10));
            store.add_player(Player::new(base + 2, 2, format!("p{}", base + 2), *pos, 10));
        }
        store.add_player(Player::new(11, 3, "p11", Position::PG, 10));
        store.add_player(Player::new(12, 3, "p12", Position::C, 60));
        store.add_user(1, "alice");
        store.add_user(2, "bob");
        let manager = RosterManager::new(store.clone(), RosterRules::default()).unwrap();
        (manager, store)
    }

    #[test]
    fn full_roster_exhausts_budget_exactly() {
        let (manager, _) = seed();
        for player_id in 1..=10 {
            manager.add_player(1, 1, player_id).unwrap();
        }
        let status = manager.roster_status(1, 1).unwrap();
        assert_eq!(status.selected_count, 10);
        assert_eq!(status.used_budget, 100);
        assert_eq!(status.remaining_budget, 0);
    }

    #[test]
    fn unknown_user_and_player_are_not_found() {
        let (manager, _) = seed();
        assert_eq!(manager.add_player(99, 1, 1), Err(EngineError::UserNotFound(99)));
        assert_eq!(manager.add_player(1, 1, 99), Err(EngineError::PlayerNotFound(99)));
    }

    #[test]
    fn duplicate_pick_rejected() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        let err = manager.add_player(1, 1, 1).unwrap_err();
        assert_eq!(err, EngineError::DuplicatePlayer(1));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn size_limit_wins_over_position_cap() {
        let (manager, _) = seed();
        for player_id in 1..=10 {
            manager.add_player(1, 1, player_id).unwrap();
        }
        // player 11 is a third PG, so both size and position are violated;
        // size is checked first
        assert_eq!(
            manager.add_player(1, 1, 11),
            Err(EngineError::RosterFull { count: 10, max: 10 })
        );
    }

    #[test]
    fn position_cap_wins_over_budget() {
        let (manager, _) = seed();
        for player_id in [9, 10, 1, 3, 5, 7] {
            manager.add_player(1, 1, player_id).unwrap();
        }
        // player 12 is a third center costing 60 against 40 remaining; the
        // position check fires before the budget check
        assert_eq!(
            manager.add_player(1, 1, 12),
            Err(EngineError::PositionFull { position: Position::C, count: 2, max: 2 })
        );
    }

    #[test]
    fn budget_violation_reports_numbers() {
        let (manager, _) = seed();
        for player_id in [1, 3, 5, 7, 9] {
            manager.add_player(1, 1, player_id).unwrap();
        }
        assert_eq!(
            manager.add_player(1, 1, 12),
            Err(EngineError::BudgetExceeded { used: 50, cost: 60, limit: 100 })
        );
        // the rejected add left no partial state behind
        assert_eq!(manager.roster_status(1, 1).unwrap().used_budget, 50);
    }

    #[test]
    fn oversized_cost_rejected_without_overflow() {
        let (manager, store) = seed();
        store.add_player(Player::new(13, 3, "p13", Position::SF, u32::MAX));
        manager.add_player(1, 1, 1).unwrap();
        // used + cost would wrap a u32; the add must still land on the
        // typed budget rejection
        assert_eq!(
            manager.add_player(1, 1, 13),
            Err(EngineError::BudgetExceeded { used: 10, cost: u32::MAX, limit: 100 })
        );
        assert_eq!(manager.roster_status(1, 1).unwrap().used_budget, 10);
    }

    #[test]
    fn duplicate_check_runs_before_budget() {
        let (manager, _) = seed();
        for player_id in [12, 1, 3, 5] {
            manager.add_player(1, 1, player_id).unwrap();
        }
        // re-adding 12 would also blow the budget (90 + 60), but uniqueness
        // is checked first
        assert_eq!(manager.add_player(1, 1, 12), Err(EngineError::DuplicatePlayer(12)));
    }

    #[test]
    fn first_player_at_position_starts_second_benches() {
        let (manager, _) = seed();
        let status = manager.add_player(1, 1, 1).unwrap();
        assert!(status.players[0].on_court);
        let status = manager.add_player(1, 1, 2).unwrap();
        let second = status.players.iter().find(|p| p.player_id == 2).unwrap();
        assert!(!second.on_court);
    }

    #[test]
    fn remove_player_and_missing_entry() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        let status = manager.remove_player(1, 1, 1).unwrap();
        assert_eq!(status.selected_count, 0);
        assert_eq!(
            manager.remove_player(1, 1, 1),
            Err(EngineError::EntryNotFound { player_id: 1, round: 1 })
        );
    }

    #[test]
    fn clear_roster_is_idempotent() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        manager.add_player(1, 1, 3).unwrap();
        assert_eq!(manager.clear_roster(1, 1).unwrap(), 2);
        assert_eq!(manager.clear_roster(1, 1).unwrap(), 0);
    }

    #[test]
    fn locked_round_rejects_mutations() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        manager.set_locked(1, 1, true).unwrap();
        assert_eq!(manager.add_player(1, 1, 3), Err(EngineError::RosterLocked { round: 1 }));
        assert_eq!(manager.remove_player(1, 1, 1), Err(EngineError::RosterLocked { round: 1 }));
        assert_eq!(manager.clear_roster(1, 1), Err(EngineError::RosterLocked { round: 1 }));
        manager.set_locked(1, 1, false).unwrap();
        manager.add_player(1, 1, 3).unwrap();
    }

    #[test]
    fn locked_round_leaves_reads_open() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        manager.set_locked(1, 1, true).unwrap();
        let status = manager.roster_status(1, 1).unwrap();
        assert!(status.locked);
        assert_eq!(status.selected_count, 1);
    }

    #[test]
    fn move_to_empty_slot_flips_only_that_entry() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap(); // PG on court
        manager.add_player(1, 1, 3).unwrap(); // SG on court
        let outcome = manager
            .move_or_swap(1, 1, Slot::court(Position::PG), Slot::bench(Position::PG))
            .unwrap();
        assert_eq!(outcome.action, MoveAction::Moved);
        assert_eq!(outcome.moved_player, 1);
        assert_eq!(outcome.displaced_player, None);

        let status = manager.roster_status(1, 1).unwrap();
        assert!(!status.players.iter().find(|p| p.player_id == 1).unwrap().on_court);
        assert!(status.players.iter().find(|p| p.player_id == 3).unwrap().on_court);
        assert_eq!(status.used_budget, 20);
    }

    #[test]
    fn cross_position_swap_exchanges_exactly_two_flags() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap(); // PG court
        manager.add_player(1, 1, 2).unwrap(); // PG bench
        manager.add_player(1, 1, 3).unwrap(); // SG court
        let outcome = manager
            .move_or_swap(1, 1, Slot::bench(Position::PG), Slot::court(Position::SG))
            .unwrap();
        assert_eq!(outcome.action, MoveAction::Swapped);
        assert_eq!(outcome.moved_player, 2);
        assert_eq!(outcome.displaced_player, Some(3));

        let status = manager.roster_status(1, 1).unwrap();
        let on_court: Vec<PlayerId> = status
            .players
            .iter()
            .filter(|p| p.on_court)
            .map(|p| p.player_id)
            .collect();
        assert_eq!(on_court, vec![1, 2]);
        assert_eq!(status.selected_count, 3);
        assert_eq!(status.used_budget, 30);
    }

    #[test]
    fn empty_source_slot_names_the_slot() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        let err = manager
            .move_or_swap(1, 1, Slot::bench(Position::C), Slot::court(Position::C))
            .unwrap_err();
        assert_eq!(err, EngineError::SlotEmpty { position: Position::C, side: CourtSide::Bench });
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn same_slot_move_is_a_noop() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        let outcome = manager
            .move_or_swap(1, 1, Slot::court(Position::PG), Slot::court(Position::PG))
            .unwrap();
        assert_eq!(outcome.action, MoveAction::Moved);
        assert!(manager.roster_status(1, 1).unwrap().players[0].on_court);
    }

    #[test]
    fn rosters_are_scoped_per_user_and_round() {
        let (manager, _) = seed();
        manager.add_player(1, 1, 1).unwrap();
        manager.add_player(2, 1, 1).unwrap();
        manager.add_player(1, 2, 1).unwrap();
        assert_eq!(manager.roster_status(1, 1).unwrap().selected_count, 1);
        assert_eq!(manager.roster_status(2, 1).unwrap().selected_count, 1);
        assert_eq!(manager.roster_status(1, 2).unwrap().selected_count, 1);
    }

    #[test]
    fn lock_flip_serializes_with_concurrent_adds() {
        let (manager, _) = seed();
        let manager = Arc::new(manager);
        std::thread::scope(|scope| {
            for player_id in [1, 3, 5, 7, 9] {
                let manager = Arc::clone(&manager);
                scope.spawn(move || {
                    let _ = manager.add_player(1, 1, player_id);
                });
            }
            let manager = Arc::clone(&manager);
            scope.spawn(move || {
                manager.set_locked(1, 1, true).unwrap();
            });
        });
        // every add either completed before the freeze landed or was
        // rejected; none can slip in after it
        let status = manager.roster_status(1, 1).unwrap();
        assert!(status.locked);
        assert_eq!(
            manager.add_player(1, 1, 2),
            Err(EngineError::RosterLocked { round: 1 })
        );
        assert!(status.used_budget <= 100);
    }

    #[test]
    fn concurrent_adds_never_exceed_budget() {
        let (manager, _) = seed();
        let manager = Arc::new(manager);
        // 1, 3, 5, 7, 9 (10 each) plus 12 (60) total 110; one add must lose
        std::thread::scope(|scope| {
            for player_id in [1, 3, 5, 7, 9, 12] {
                let manager = Arc::clone(&manager);
                scope.spawn(move || {
                    let _ = manager.add_player(1, 1, player_id);
                });
            }
        });
        let status = manager.roster_status(1, 1).unwrap();
        assert!(status.used_budget <= 100);
        assert!(status.selected_count <= 6);
    }
}
