use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Fixed subject set for flashcards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    History,
    Language,
    Programming,
    Other,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::Science,
        Subject::History,
        Subject::Language,
        Subject::Programming,
        Subject::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Science => "science",
            Subject::History => "history",
            Subject::Language => "language",
            Subject::Programming => "programming",
            Subject::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "math" | "maths" | "m" => Some(Subject::Math),
            "science" | "sci" => Some(Subject::Science),
            "history" | "hist" | "h" => Some(Subject::History),
            "language" | "lang" | "l" => Some(Subject::Language),
            "programming" | "prog" | "code" | "p" => Some(Subject::Programming),
            "other" | "o" => Some(Subject::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::History => "History",
            Subject::Language => "Language",
            Subject::Programming => "Programming",
            Subject::Other => "Other",
        }
    }
}

// Card difficulty, set at creation; only scales the base review interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "e" | "1" => Some(Difficulty::Easy),
            "medium" | "med" | "m" | "2" => Some(Difficulty::Medium),
            "hard" | "h" | "3" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

// Event kinds that can qualify for the daily streak; which ones actually
// count is configuration, not engine logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    TaskCompleted,
    CardReviewed,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::TaskCompleted => "task_completed",
            ActivityKind::CardReviewed => "card_reviewed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "task_completed" | "task" | "t" => Some(ActivityKind::TaskCompleted),
            "card_reviewed" | "review" | "r" => Some(ActivityKind::CardReviewed),
            _ => None,
        }
    }
}

// One recorded recall attempt; the history is append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub reviewed_at: DateTime<Utc>,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: u64,
    pub question: String,
    pub answer: String,
    pub subject: Subject,
    pub difficulty: Difficulty,
    // Current spacing in whole days, always >= 1
    pub interval_days: u32,
    // The card is eligible for review once due_date <= today
    pub due_date: NaiveDate,
    pub review_history: Vec<ReviewEntry>,
}

impl Flashcard {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }

    pub fn total_reviews(&self) -> usize {
        self.review_history.len()
    }

    pub fn correct_reviews(&self) -> usize {
        self.review_history.iter().filter(|r| r.correct).count()
    }

    // Recall accuracy as a rounded integer percentage; 0 with no history
    pub fn accuracy(&self) -> u32 {
        if self.review_history.is_empty() {
            0
        } else {
            let correct = self.correct_reviews() as f64;
            let total = self.total_reviews() as f64;
            ((correct / total) * 100.0).round() as u32
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
