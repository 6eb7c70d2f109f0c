use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// XP cost of each level step: reaching level L+1 from L costs 100 * L.
// Cumulative threshold is triangular, so the curve is strictly convex.
const XP_PER_LEVEL_STEP: u64 = 100;

// Cumulative XP required to reach `level`. threshold(1) = 0, so a fresh
// ledger sits at level 1.
pub fn threshold(level: u32) -> u64 {
    let l = level as u64;
    XP_PER_LEVEL_STEP * (l - 1) * l / 2
}

// The XP ledger. `total_xp` is the only stored field; level and progress
// are derived from it and have no other mutation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceState {
    pub total_xp: u64,
}

impl ExperienceState {
    // Largest L with threshold(L) <= total_xp
    pub fn level(&self) -> u32 {
        let mut level = 1;
        while self.total_xp >= threshold(level + 1) {
            level += 1;
        }
        level
    }

    // Progress within the current level as a percentage in [0, 100).
    // 100 is never reported: at the next threshold the level advances
    // and the numerator resets.
    pub fn progress_to_next_level(&self) -> f64 {
        let level = self.level();
        let floor = threshold(level);
        let span = threshold(level + 1) - floor;
        ((self.total_xp - floor) as f64 / span as f64) * 100.0
    }

    // Adds XP and reports the levels before and after so the caller can
    // detect a level-up. Rejects negative amounts; zero is a no-op that
    // still returns the current snapshot.
    pub fn add_xp(&mut self, amount: i64) -> Result<XpAward, EngineError> {
        if amount < 0 {
            return Err(EngineError::InvalidArgument(format!(
                "XP amount must be non-negative, got {}",
                amount
            )));
        }

        let level_before = self.level();
        self.total_xp += amount as u64;

        Ok(XpAward {
            amount: amount as u64,
            level_before,
            snapshot: self.snapshot(),
        })
    }

    pub fn snapshot(&self) -> ExperienceSnapshot {
        ExperienceSnapshot {
            total_xp: self.total_xp,
            level: self.level(),
            progress_to_next_level: self.progress_to_next_level(),
        }
    }
}

// Derived view of the ledger, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSnapshot {
    pub total_xp: u64,
    pub level: u32,
    pub progress_to_next_level: f64,
}

// Result of one add_xp call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XpAward {
    pub amount: u64,
    pub level_before: u32,
    pub snapshot: ExperienceSnapshot,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.snapshot.level > self.level_before
    }
}
