use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// Count of consecutive calendar days with at least one qualifying
// activity. Dates are compared at day granularity only; which events
// qualify is decided by the caller (see EngineConfig::streak_activities).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakState {
    // Activity dates must be non-decreasing. Read-only, so callers can
    // reject an out-of-order date before committing any other state.
    pub fn check_date(&self, date: NaiveDate) -> Result<(), EngineError> {
        match self.last_activity_date {
            Some(last) if date < last => Err(EngineError::Ordering { last, new: date }),
            _ => Ok(()),
        }
    }

    // Transition table on the day gap to the last recorded activity:
    // same day keeps the streak, the next day extends it, any larger gap
    // (or no prior activity) starts over at 1. An earlier date is
    // rejected without mutation.
    pub fn record_activity(&mut self, date: NaiveDate) -> Result<&Self, EngineError> {
        self.check_date(date)?;

        match self.last_activity_date {
            None => {
                self.current_streak = 1;
            }
            Some(last) => match (date - last).num_days() {
                0 => {}
                1 => self.current_streak += 1,
                _ => self.current_streak = 1,
            },
        }

        self.last_activity_date = Some(date);
        Ok(self)
    }
}
