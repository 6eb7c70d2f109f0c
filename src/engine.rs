use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{ActivityKind, Difficulty, Flashcard, Subject};
use crate::scheduler::CardScheduler;
use crate::streak::StreakState;
use crate::xp::{ExperienceSnapshot, ExperienceState, XpAward};

// The whole persisted engine state: XP ledger, streak tracker, and the
// full card collection. Serializes losslessly; persistence is the
// caller's concern (load before an operation, save after).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub xp: ExperienceState,
    pub streak: StreakState,
    pub scheduler: CardScheduler,
}

// What one qualifying activity produced: the XP award (with levels
// before and after, so the caller can trigger level-up UI) and the
// streak after recording.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    pub kind: ActivityKind,
    pub xp: XpAward,
    pub streak: StreakState,
}

// Result of reviewing a card through the engine. The XP award is only
// present for a correct answer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub card: Flashcard,
    pub xp: Option<XpAward>,
    pub streak: StreakState,
}

// Summary snapshot of all three sub-components, for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub xp: ExperienceSnapshot,
    pub streak: StreakState,
    pub total_cards: usize,
    pub due_cards: usize,
}

// Composition root: the only component the UI calls. Wires the clock
// into the XP ledger, streak tracker, and card scheduler. Operations
// take &mut self and are not reentrant-safe; a multi-threaded host must
// serialize access.
pub struct MasteryEngine {
    state: EngineState,
    config: EngineConfig,
    clock: Box<dyn Clock>,
}

impl MasteryEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(EngineState::default(), config, Box::new(SystemClock))
    }

    pub fn from_state(state: EngineState, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(state, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        state: EngineState,
        config: EngineConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            state,
            config,
            clock,
        })
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn into_state(self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // A completed task awards its configured XP and, when task
    // completions qualify, extends the daily streak.
    pub fn complete_task(&mut self) -> Result<ActivityOutcome, EngineError> {
        self.record_qualifying(ActivityKind::TaskCompleted)?;
        let xp = self
            .state
            .xp
            .add_xp(self.config.xp_rewards.task_complete as i64)?;
        Ok(ActivityOutcome {
            kind: ActivityKind::TaskCompleted,
            xp,
            streak: self.state.streak,
        })
    }

    pub fn add_card(
        &mut self,
        question: &str,
        answer: &str,
        subject: Subject,
        difficulty: Difficulty,
    ) -> Flashcard {
        let today = self.clock.today();
        self.state
            .scheduler
            .add_card(question, answer, subject, difficulty, today)
            .clone()
    }

    pub fn delete_card(&mut self, id: u64) -> Result<Flashcard, EngineError> {
        self.state.scheduler.delete_card(id)
    }

    pub fn get_card(&self, id: u64) -> Result<&Flashcard, EngineError> {
        self.state.scheduler.get_card(id)
    }

    pub fn due_cards(&self, subject: Option<Subject>) -> Vec<&Flashcard> {
        self.state.scheduler.get_due_cards(self.clock.today(), subject)
    }

    pub fn cards_by_subject(&self, subject: Subject) -> Vec<&Flashcard> {
        self.state.scheduler.get_cards_by_subject(subject)
    }

    pub fn cards(&self) -> &[Flashcard] {
        self.state.scheduler.cards()
    }

    pub fn get_accuracy(&self, id: u64) -> Result<u32, EngineError> {
        self.state.scheduler.get_accuracy(id)
    }

    // Records the review, then (for a correct answer) feeds the reward
    // table and the streak. Any failure — unknown id, or an activity
    // date behind the persisted streak — is rejected before anything
    // mutates, so the error branch never leaves half-applied state.
    pub fn review_card(&mut self, id: u64, correct: bool) -> Result<ReviewOutcome, EngineError> {
        let now = self.clock.now();
        let today = self.clock.today();
        if correct && self.config.qualifies_for_streak(ActivityKind::CardReviewed) {
            self.state.streak.check_date(today)?;
        }
        let card = self
            .state
            .scheduler
            .review_card(id, correct, now, today, &self.config)?
            .clone();

        let xp = if correct {
            self.record_qualifying(ActivityKind::CardReviewed)?;
            Some(
                self.state
                    .xp
                    .add_xp(self.config.xp_rewards.correct_review as i64)?,
            )
        } else {
            None
        };

        Ok(ReviewOutcome {
            card,
            xp,
            streak: self.state.streak,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            xp: self.state.xp.snapshot(),
            streak: self.state.streak,
            total_cards: self.state.scheduler.len(),
            due_cards: self.due_cards(None).len(),
        }
    }

    fn record_qualifying(&mut self, kind: ActivityKind) -> Result<(), EngineError> {
        if self.config.qualifies_for_streak(kind) {
            let today = self.clock.today();
            self.state.streak.record_activity(today)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn engine_on(date: NaiveDate) -> MasteryEngine {
        MasteryEngine::with_clock(
            EngineState::default(),
            EngineConfig::default(),
            Box::new(FixedClock::on_date(date)),
        )
        .unwrap()
    }

    fn engine_with_config(date: NaiveDate, config: EngineConfig) -> MasteryEngine {
        MasteryEngine::with_clock(EngineState::default(), config, Box::new(FixedClock::on_date(date)))
            .unwrap()
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.growth_factor = 0.9;
        assert!(MasteryEngine::new(config).is_err());
    }

    #[test]
    fn completing_a_task_awards_configured_xp_and_streak() {
        let mut engine = engine_on(day(1));
        let outcome = engine.complete_task().unwrap();
        assert_eq!(outcome.xp.amount, 10);
        assert_eq!(outcome.xp.snapshot.total_xp, 10);
        assert_eq!(outcome.streak.current_streak, 1);
    }

    #[test]
    fn correct_review_awards_xp_and_extends_streak() {
        let mut engine = engine_on(day(1));
        let id = engine
            .add_card("q", "a", Subject::Math, Difficulty::Hard)
            .id;

        let outcome = engine.review_card(id, true).unwrap();
        assert_eq!(outcome.xp.unwrap().amount, 5);
        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.card.interval_days, 2);
        assert_eq!(outcome.card.due_date, day(3));
    }

    #[test]
    fn incorrect_review_awards_nothing_and_leaves_streak_alone() {
        let mut engine = engine_on(day(1));
        let id = engine
            .add_card("q", "a", Subject::Math, Difficulty::Hard)
            .id;

        let outcome = engine.review_card(id, false).unwrap();
        assert!(outcome.xp.is_none());
        assert_eq!(outcome.streak.current_streak, 0);
        assert_eq!(engine.state().xp.total_xp, 0);
    }

    #[test]
    fn review_of_unknown_card_mutates_nothing() {
        let mut engine = engine_on(day(1));
        let err = engine.review_card(42, true).unwrap_err();
        assert_eq!(err, EngineError::NotFound(42));
        assert_eq!(engine.state().xp.total_xp, 0);
        assert_eq!(engine.state().streak.current_streak, 0);
    }

    #[test]
    fn review_behind_persisted_streak_date_mutates_nothing() {
        // Restored state whose last activity is ahead of the clock: the
        // ordering rejection must fire before the card is touched
        let mut state = EngineState::default();
        state.streak.record_activity(day(5)).unwrap();
        let mut engine = MasteryEngine::with_clock(
            state,
            EngineConfig::default(),
            Box::new(FixedClock::on_date(day(3))),
        )
        .unwrap();
        let id = engine
            .add_card("q", "a", Subject::Math, Difficulty::Hard)
            .id;
        let before = engine.get_card(id).unwrap().clone();

        let err = engine.review_card(id, true).unwrap_err();
        assert!(matches!(err, EngineError::Ordering { .. }));
        assert_eq!(engine.get_card(id).unwrap(), &before);
        assert_eq!(engine.state().xp.total_xp, 0);
        assert_eq!(engine.state().streak.current_streak, 1);

        // An incorrect review records no activity, so it still goes through
        let outcome = engine.review_card(id, false).unwrap();
        assert_eq!(outcome.card.total_reviews(), 1);
    }

    #[test]
    fn custom_reward_table_is_honored() {
        let mut config = EngineConfig::default();
        config.xp_rewards.task_complete = 25;
        config.xp_rewards.correct_review = 1;
        let mut engine = engine_with_config(day(1), config);

        assert_eq!(engine.complete_task().unwrap().xp.amount, 25);
        let id = engine
            .add_card("q", "a", Subject::Other, Difficulty::Easy)
            .id;
        assert_eq!(engine.review_card(id, true).unwrap().xp.unwrap().amount, 1);
    }

    #[test]
    fn streak_activity_set_is_honored() {
        // Only task completions qualify; card reviews leave the streak alone
        let mut config = EngineConfig::default();
        config.streak_activities = vec![ActivityKind::TaskCompleted];
        let mut engine = engine_with_config(day(1), config);

        let id = engine
            .add_card("q", "a", Subject::Math, Difficulty::Hard)
            .id;
        let outcome = engine.review_card(id, true).unwrap();
        assert_eq!(outcome.streak.current_streak, 0);
        // XP is still awarded; only the streak is gated
        assert!(outcome.xp.is_some());

        let outcome = engine.complete_task().unwrap();
        assert_eq!(outcome.streak.current_streak, 1);
    }

    #[test]
    fn mixed_activity_across_days_builds_one_streak() {
        let mut engine = engine_on(day(1));
        let id = engine
            .add_card("q", "a", Subject::Math, Difficulty::Hard)
            .id;

        engine.complete_task().unwrap();

        engine.clock = Box::new(FixedClock::on_date(day(2)));
        engine.review_card(id, true).unwrap();

        engine.clock = Box::new(FixedClock::on_date(day(3)));
        let outcome = engine.complete_task().unwrap();
        assert_eq!(outcome.streak.current_streak, 3);
    }

    #[test]
    fn level_up_is_reported_through_the_award() {
        // 100 XP to level 2; ten task completions at 10 XP each
        let mut engine = engine_on(day(1));
        let mut leveled = false;
        for _ in 0..10 {
            leveled = engine.complete_task().unwrap().xp.leveled_up();
        }
        assert!(leveled);
        assert_eq!(engine.state().xp.level(), 2);
    }

    #[test]
    fn snapshot_summarizes_all_three_components() {
        let mut engine = engine_on(day(1));
        engine.complete_task().unwrap();
        engine.add_card("q1", "a1", Subject::Math, Difficulty::Hard);
        let id = engine
            .add_card("q2", "a2", Subject::Math, Difficulty::Hard)
            .id;
        engine.review_card(id, true).unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.xp.total_xp, 15);
        assert_eq!(snapshot.streak.current_streak, 1);
        assert_eq!(snapshot.total_cards, 2);
        assert_eq!(snapshot.due_cards, 1);
    }

    #[test]
    fn full_state_round_trips_through_json() {
        let mut engine = engine_on(day(1));
        engine.complete_task().unwrap();
        let id = engine
            .add_card("q", "a", Subject::Language, Difficulty::Medium)
            .id;
        engine.review_card(id, true).unwrap();
        engine.review_card(id, false).unwrap();

        let state = engine.state().clone();
        let json = serde_json::to_string(&state).unwrap();
        let back: EngineState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        // A restored engine serves identical queries
        let restored = MasteryEngine::with_clock(
            back,
            EngineConfig::default(),
            Box::new(FixedClock::on_date(day(1))),
        )
        .unwrap();
        assert_eq!(restored.state(), &state);
        assert_eq!(restored.get_accuracy(id).unwrap(), 50);
    }
}
