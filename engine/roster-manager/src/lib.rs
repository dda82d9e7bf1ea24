//! Roster manager - validates and applies roster mutations.
//!
//! Enforces the roster-construction invariants (uniqueness, size, positional
//! cap, budget) atomically per (user, round): every check runs before any
//! write, the first violation wins, and mutations for the same (user, round)
//! are serialized so concurrent adds cannot jointly exceed a limit.

mod config;
mod manager;
mod slots;
mod status;

pub use config::RosterRules;
pub use manager::RosterManager;
pub use slots::Slot;
pub use status::{MoveAction, MoveOutcome, RosterPlayer, RosterStatus};
