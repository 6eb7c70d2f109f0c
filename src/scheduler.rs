use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{Difficulty, Flashcard, ReviewEntry, Subject};

// Owns every flashcard and its spaced-repetition state. Cards are kept
// in insertion order; ids come from a monotone counter and are never
// reused after deletion, which makes the (due_date, id) ordering of the
// due query deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardScheduler {
    cards: Vec<Flashcard>,
    next_card_id: u64,
}

impl CardScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // A new card starts at interval 1 and is due immediately
    pub fn add_card(
        &mut self,
        question: &str,
        answer: &str,
        subject: Subject,
        difficulty: Difficulty,
        today: NaiveDate,
    ) -> &Flashcard {
        self.next_card_id += 1;
        self.cards.push(Flashcard {
            id: self.next_card_id,
            question: question.to_string(),
            answer: answer.to_string(),
            subject,
            difficulty,
            interval_days: 1,
            due_date: today,
            review_history: Vec::new(),
        });
        self.cards.last().expect("card was just pushed")
    }

    // Irreversible; other cards' schedules are unaffected
    pub fn delete_card(&mut self, id: u64) -> Result<Flashcard, EngineError> {
        let index = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or(EngineError::NotFound(id))?;
        Ok(self.cards.remove(index))
    }

    pub fn get_card(&self, id: u64) -> Result<&Flashcard, EngineError> {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    // Cards with due_date <= today, ordered by due date then id. Pure:
    // repeated calls return identical results absent intervening reviews.
    pub fn get_due_cards(&self, today: NaiveDate, subject: Option<Subject>) -> Vec<&Flashcard> {
        let mut due: Vec<&Flashcard> = self
            .cards
            .iter()
            .filter(|c| c.is_due(today))
            .filter(|c| subject.map_or(true, |s| c.subject == s))
            .collect();
        due.sort_by_key(|c| (c.due_date, c.id));
        due
    }

    // Insertion order preserved
    pub fn get_cards_by_subject(&self, subject: Subject) -> Vec<&Flashcard> {
        self.cards.iter().filter(|c| c.subject == subject).collect()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    // Appends the outcome to the card's history and reschedules it.
    // Correct recall grows the interval by the configured factor (never
    // below the difficulty's base, never above the cap); a lapse resets
    // it to the base. The new due date is anchored on the review's own
    // date, so an early review still reschedules from today.
    pub fn review_card(
        &mut self,
        id: u64,
        correct: bool,
        now: DateTime<Utc>,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> Result<&Flashcard, EngineError> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EngineError::NotFound(id))?;

        card.review_history.push(ReviewEntry {
            reviewed_at: now,
            correct,
        });

        let base = config.base_interval(card.difficulty);
        card.interval_days = if correct {
            let grown = (card.interval_days as f64 * config.growth_factor).round() as u32;
            grown.max(base).min(config.interval_cap_days)
        } else {
            base
        };
        card.due_date = today + Duration::days(card.interval_days as i64);

        Ok(&*card)
    }

    pub fn get_accuracy(&self, id: u64) -> Result<u32, EngineError> {
        Ok(self.get_card(id)?.accuracy())
    }
}
