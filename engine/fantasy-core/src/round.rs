//! Current-round resolution.
//!
//! Exactly one round is open for roster edits at a time. The round value is
//! externally owned; callers resolve it once per request through
//! [`CurrentRoundProvider`] and pass it explicitly into every engine call,
//! keeping the engine free of ambient state.

use crate::types::Round;
use std::sync::atomic::{AtomicU32, Ordering};

pub trait CurrentRoundProvider: Send + Sync {
    fn current_round(&self) -> Round;
}

/// Shared, externally-advanced current round. Defaults to round 1 when unset.
#[derive(Debug)]
pub struct SharedCurrentRound(AtomicU32);

impl SharedCurrentRound {
    pub fn new(round: Round) -> Self {
        Self(AtomicU32::new(round))
    }

    /// Advance (or rewind) the globally current round.
    pub fn set(&self, round: Round) {
        self.0.store(round, Ordering::SeqCst);
    }
}

impl Default for SharedCurrentRound {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CurrentRoundProvider for SharedCurrentRound {
    fn current_round(&self) -> Round {
        self.0.load(Ordering::SeqCst)
    }
}
