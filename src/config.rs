use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{ActivityKind, Difficulty};

// Base review interval per difficulty, in days. Easier cards start with
// wider spacing: easy >= medium >= hard must hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseIntervals {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for BaseIntervals {
    fn default() -> Self {
        Self {
            easy: 4,
            medium: 2,
            hard: 1,
        }
    }
}

// XP awarded per qualifying event. A reward table, not engine logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpRewards {
    pub task_complete: u64,
    pub correct_review: u64,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            task_complete: 10,
            correct_review: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Interval multiplier applied on each correct review; must exceed 1
    pub growth_factor: f64,
    pub base_intervals: BaseIntervals,
    // Upper bound on any interval, to keep schedules from drifting
    // out past the horizon
    pub interval_cap_days: u32,
    pub xp_rewards: XpRewards,
    // Which event kinds count toward the daily streak
    pub streak_activities: Vec<ActivityKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            growth_factor: 2.0,
            base_intervals: BaseIntervals::default(),
            interval_cap_days: 90,
            xp_rewards: XpRewards::default(),
            streak_activities: vec![ActivityKind::TaskCompleted, ActivityKind::CardReviewed],
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.growth_factor > 1.0) {
            return Err(EngineError::InvalidArgument(format!(
                "growth_factor must be greater than 1, got {}",
                self.growth_factor
            )));
        }

        let b = self.base_intervals;
        if b.hard < 1 {
            return Err(EngineError::InvalidArgument(
                "base interval for hard cards must be at least 1 day".to_string(),
            ));
        }
        if !(b.easy >= b.medium && b.medium >= b.hard) {
            return Err(EngineError::InvalidArgument(format!(
                "base intervals must satisfy easy >= medium >= hard, got {}/{}/{}",
                b.easy, b.medium, b.hard
            )));
        }

        if self.interval_cap_days < b.easy {
            return Err(EngineError::InvalidArgument(format!(
                "interval_cap_days ({}) must not be below the easy base interval ({})",
                self.interval_cap_days, b.easy
            )));
        }

        Ok(())
    }

    pub fn base_interval(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.base_intervals.easy,
            Difficulty::Medium => self.base_intervals.medium,
            Difficulty::Hard => self.base_intervals.hard,
        }
    }

    pub fn qualifies_for_streak(&self, kind: ActivityKind) -> bool {
        self.streak_activities.contains(&kind)
    }
}
