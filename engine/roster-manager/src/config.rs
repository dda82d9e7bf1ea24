use fantasy_core::types::{Position, DEFAULT_BUDGET};
use fantasy_core::{EngineError, Result};

/// Roster-construction limits, checked on every mutation.
#[derive(Debug, Clone, Copy)]
pub struct RosterRules {
    /// Spending cap on summed player costs per (user, round).
    pub budget_limit: u32,
    /// Active roster entries allowed per (user, round).
    pub max_players: usize,
    /// Active entries allowed per position.
    pub max_per_position: usize,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self { budget_limit: DEFAULT_BUDGET, max_players: 10, max_per_position: 2 }
    }
}

impl RosterRules {
    pub fn validate(&self) -> Result<()> {
        if self.budget_limit == 0 {
            return Err(EngineError::InvalidRules("budget_limit must be positive"));
        }
        if self.max_players == 0 {
            return Err(EngineError::InvalidRules("max_players must be positive"));
        }
        if self.max_per_position == 0 {
            return Err(EngineError::InvalidRules("max_per_position must be positive"));
        }
        if self.max_per_position * Position::ALL.len() < self.max_players {
            return Err(EngineError::InvalidRules(
                "position caps make the roster size unreachable",
            ));
        }
        Ok(())
    }
}
