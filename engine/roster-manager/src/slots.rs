//! Court/bench slot addressing for move and swap operations.

use fantasy_core::types::{CourtSide, PlayerId, Position, RosterEntry};
use fantasy_core::Player;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A (position, court-side) address within a roster.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub position: Position,
    pub side: CourtSide,
}

impl Slot {
    pub fn new(position: Position, side: CourtSide) -> Self {
        Self { position, side }
    }

    pub fn court(position: Position) -> Self {
        Self::new(position, CourtSide::Court)
    }

    pub fn bench(position: Position) -> Self {
        Self::new(position, CourtSide::Bench)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.position, self.side)
    }
}

/// Projection of a roster onto its slots.
///
/// Adds place at most one player per slot, but a cross-position swap (bench
/// my PG, start my SG) can legally leave two same-position players on one
/// side. Occupancy lookup is therefore a sorted list per slot, and "the
/// occupant" is the lowest player id - well defined and deterministic rather
/// than first-match luck.
#[derive(Debug, Default)]
pub(crate) struct SlotGrid {
    occupants: HashMap<Slot, Vec<PlayerId>>,
}

impl SlotGrid {
    pub(crate) fn build(roster: &[(RosterEntry, Player)]) -> Self {
        let mut occupants: HashMap<Slot, Vec<PlayerId>> = HashMap::new();
        for (entry, player) in roster {
            occupants
                .entry(Slot::new(player.position, entry.side()))
                .or_default()
                .push(entry.player_id);
        }
        for ids in occupants.values_mut() {
            ids.sort_unstable();
        }
        Self { occupants }
    }

    pub(crate) fn occupant(&self, slot: Slot) -> Option<PlayerId> {
        self.occupants.get(&slot).and_then(|ids| ids.first().copied())
    }
}
