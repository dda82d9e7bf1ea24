//! Structured mutation outcomes handed back to the caller.

use crate::slots::Slot;
use fantasy_core::types::{PlayerId, Position, Round, TeamId};
use serde::{Deserialize, Serialize};

/// Read-only roster projection. Budget figures are recomputed from the
/// current active entries on every call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterStatus {
    pub round: Round,
    pub total_budget: u32,
    pub used_budget: u32,
    pub remaining_budget: u32,
    pub selected_count: usize,
    pub max_players: usize,
    pub locked: bool,
    pub players: Vec<RosterPlayer>,
}

/// One roster member within a [`RosterStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team_id: TeamId,
    pub cost: u32,
    pub total_points: i32,
    pub on_court: bool,
}

/// Whether a court/bench change turned out to be a move or a swap.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum MoveAction {
    /// Source entry flipped into an empty target slot.
    Moved,
    /// Source and target entries exchanged their court/bench flags.
    Swapped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub action: MoveAction,
    pub from: Slot,
    pub to: Slot,
    pub moved_player: PlayerId,
    /// The target occupant whose side changed too, when the operation was a
    /// swap.
    pub displaced_player: Option<PlayerId>,
}
