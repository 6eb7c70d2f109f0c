// Progress & mastery engine for a study tracker. Pure state-transition
// functions over explicit owned state: an XP ledger, a daily streak
// tracker, and a spaced-repetition card scheduler, composed behind
// MasteryEngine with an injected clock. Persistence and rendering are
// the caller's concern.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod streak;
pub mod xp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BaseIntervals, EngineConfig, XpRewards};
pub use engine::{ActivityOutcome, EngineState, MasteryEngine, ReviewOutcome, Snapshot};
pub use error::{EngineError, StoreError};
pub use models::{ActivityKind, Difficulty, Flashcard, ReviewEntry, Subject};
pub use scheduler::CardScheduler;
pub use store::StateStore;
pub use streak::StreakState;
pub use xp::{ExperienceSnapshot, ExperienceState, XpAward};
