use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mastery::config::EngineConfig;
use mastery::engine::MasteryEngine;
use mastery::error::EngineError;
use mastery::models::{Difficulty, Flashcard, JsonOutput, Subject};
use mastery::store::StateStore;

const DEFAULT_DB_NAME: &str = "mastery.db";

#[derive(Parser)]
#[command(name = "mastery")]
#[command(about = "Progress & mastery engine: XP levels, streaks, and spaced-repetition flashcards")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to a JSON config file overriding the engine defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the state store
    Init,

    /// Record study-tracker task events
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage flashcards
    #[command(subcommand)]
    Card(CardCommands),

    /// Show XP, streak, and card statistics
    Stats,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Record a completed task (awards XP and feeds the streak)
    Complete,
}

#[derive(Subcommand)]
enum CardCommands {
    /// List all cards
    List {
        /// Filter by subject
        #[arg(long, short)]
        subject: Option<String>,
    },

    /// Add a new flashcard (immediately due)
    Add {
        /// Question text
        question: String,

        /// Answer text
        answer: String,

        /// Subject: math/science/history/language/programming/other
        #[arg(long, short)]
        subject: String,

        /// Difficulty: easy/medium/hard
        #[arg(long, short)]
        difficulty: String,
    },

    /// List cards due for review today
    Due {
        /// Filter by subject
        #[arg(long, short)]
        subject: Option<String>,
    },

    /// Show card details
    Show {
        /// Card ID
        id: u64,
    },

    /// Record a review outcome for a card
    Review {
        /// Card ID
        id: u64,

        /// Review outcome: correct/incorrect
        #[arg(long, short)]
        outcome: String,
    },

    /// Delete a card permanently
    Delete {
        /// Card ID
        id: u64,
    },

    /// Show a card's recall accuracy
    Accuracy {
        /// Card ID
        id: u64,
    },
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("MASTERY_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mastery");
    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => Some(p.clone()),
        None => std::env::var("MASTERY_CONFIG").ok().map(PathBuf::from),
    };

    let config = match path {
        Some(p) => {
            let raw = std::fs::read_to_string(&p)
                .map_err(|e| format!("cannot read config {}: {}", p.display(), e))?;
            serde_json::from_str(&raw)?
        }
        None => EngineConfig::default(),
    };

    config.validate()?;
    Ok(config)
}

fn parse_outcome(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "correct" | "c" | "yes" | "y" | "right" | "1" => Some(true),
        "incorrect" | "wrong" | "i" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_subject(s: &str) -> Result<Subject, Box<dyn std::error::Error>> {
    Subject::from_str(s).ok_or_else(|| {
        format!(
            "Invalid subject '{}'. Use: math, science, history, language, programming, or other",
            s
        )
        .into()
    })
}

fn parse_difficulty(s: &str) -> Result<Difficulty, Box<dyn std::error::Error>> {
    Difficulty::from_str(s)
        .ok_or_else(|| format!("Invalid difficulty '{}'. Use: easy, medium, or hard", s).into())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_ref())?;
    let db_path = get_db_path();
    let store = StateStore::open(&db_path)?;
    store.init()?;

    let state = store.load()?.unwrap_or_default();
    let mut engine = MasteryEngine::from_state(state, config)?;

    match cli.command {
        Commands::Init => {
            store.save(engine.state())?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("State store initialized at: {}", db_path.display());
            }
        }

        Commands::Task(task_cmd) => match task_cmd {
            TaskCommands::Complete => {
                let outcome = engine.complete_task()?;
                store.save(engine.state())?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&outcome))?);
                } else {
                    println!(
                        "Task complete: +{} XP (total {}, level {}, {:.0}% to next)",
                        outcome.xp.amount,
                        outcome.xp.snapshot.total_xp,
                        outcome.xp.snapshot.level,
                        outcome.xp.snapshot.progress_to_next_level
                    );
                    if outcome.xp.leveled_up() {
                        println!("Level up! You are now level {}.", outcome.xp.snapshot.level);
                    }
                    println!("Streak: {} day(s)", outcome.streak.current_streak);
                }
            }
        },

        Commands::Card(card_cmd) => match card_cmd {
            CardCommands::List { subject } => {
                let cards: Vec<&Flashcard> = match subject {
                    Some(s) => engine.cards_by_subject(parse_subject(&s)?),
                    None => engine.cards().iter().collect(),
                };

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&cards))?);
                } else if cards.is_empty() {
                    println!("No cards found.");
                } else {
                    print_card_table(&cards);
                }
            }

            CardCommands::Add {
                question,
                answer,
                subject,
                difficulty,
            } => {
                let subject = parse_subject(&subject)?;
                let difficulty = parse_difficulty(&difficulty)?;

                let card = engine.add_card(&question, &answer, subject, difficulty);
                store.save(engine.state())?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&card))?);
                } else {
                    println!(
                        "Added {} card '{}' with ID: {} (due today)",
                        card.difficulty.as_str(),
                        truncate(&card.question, 40),
                        card.id
                    );
                }
            }

            CardCommands::Due { subject } => {
                let subject = subject.map(|s| parse_subject(&s)).transpose()?;
                let cards = engine.due_cards(subject);

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&cards))?);
                } else if cards.is_empty() {
                    println!("No cards due. Nice work!");
                } else {
                    println!("{} card(s) due for review:", cards.len());
                    print_card_table(&cards);
                }
            }

            CardCommands::Show { id } => match engine.get_card(id) {
                Ok(card) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(card))?);
                    } else {
                        println!("Card: {}", card.question);
                        println!("ID: {}", card.id);
                        println!("Answer: {}", card.answer);
                        println!("Subject: {}", card.subject.label());
                        println!("Difficulty: {}", card.difficulty.label());
                        println!("Interval: {} day(s)", card.interval_days);
                        println!("Due: {}", card.due_date);
                        println!(
                            "Reviews: {} ({}% accuracy)",
                            card.total_reviews(),
                            card.accuracy()
                        );
                    }
                }
                Err(EngineError::NotFound(_)) => print_not_found(cli.json)?,
                Err(e) => return Err(e.into()),
            },

            CardCommands::Review { id, outcome } => {
                let correct = parse_outcome(&outcome).ok_or_else(|| {
                    format!("Invalid outcome '{}'. Use: correct or incorrect", outcome)
                })?;

                match engine.review_card(id, correct) {
                    Ok(result) => {
                        store.save(engine.state())?;
                        if cli.json {
                            println!("{}", serde_json::to_string(&JsonOutput::ok(&result))?);
                        } else {
                            println!(
                                "Review recorded for card {} ({}).",
                                id,
                                if correct { "correct" } else { "incorrect" }
                            );
                            println!(
                                "New interval: {} day(s), due {}",
                                result.card.interval_days, result.card.due_date
                            );
                            if let Some(xp) = &result.xp {
                                println!(
                                    "+{} XP (total {}, level {})",
                                    xp.amount, xp.snapshot.total_xp, xp.snapshot.level
                                );
                                if xp.leveled_up() {
                                    println!("Level up! You are now level {}.", xp.snapshot.level);
                                }
                            }
                        }
                    }
                    Err(EngineError::NotFound(_)) => print_not_found(cli.json)?,
                    Err(e) => return Err(e.into()),
                }
            }

            CardCommands::Delete { id } => match engine.delete_card(id) {
                Ok(_) => {
                    store.save(engine.state())?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("Card {} deleted.", id);
                    }
                }
                Err(EngineError::NotFound(_)) => print_not_found(cli.json)?,
                Err(e) => return Err(e.into()),
            },

            CardCommands::Accuracy { id } => match engine.get_accuracy(id) {
                Ok(accuracy) => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "id": id,
                                "accuracy": accuracy
                            })))?
                        );
                    } else {
                        println!("Card {} accuracy: {}%", id, accuracy);
                    }
                }
                Err(EngineError::NotFound(_)) => print_not_found(cli.json)?,
                Err(e) => return Err(e.into()),
            },
        },

        Commands::Stats => {
            let snapshot = engine.snapshot();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&snapshot))?);
            } else {
                println!("=== Progress ===");
                println!("Total XP: {}", snapshot.xp.total_xp);
                println!(
                    "Level: {} ({:.0}% to next)",
                    snapshot.xp.level, snapshot.xp.progress_to_next_level
                );
                println!("Streak: {} day(s)", snapshot.streak.current_streak);
                if let Some(last) = snapshot.streak.last_activity_date {
                    println!("Last activity: {}", last);
                }
                println!("Cards: {} ({} due)", snapshot.total_cards, snapshot.due_cards);
            }
        }
    }

    Ok(())
}

fn print_not_found(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&JsonOutput::<()>::err("Card not found"))?
        );
    } else {
        println!("Card not found.");
    }
    Ok(())
}

fn print_card_table(cards: &[&Flashcard]) {
    println!(
        "{:<5} {:<12} {:<8} {:<5} {:<12} {:<5} QUESTION",
        "ID", "SUBJECT", "DIFF", "INT", "DUE", "ACC%"
    );
    println!("{}", "-".repeat(90));
    for card in cards {
        println!(
            "{:<5} {:<12} {:<8} {:<5} {:<12} {:<5} {}",
            card.id,
            card.subject.as_str(),
            card.difficulty.as_str(),
            card.interval_days,
            card.due_date.to_string(),
            card.accuracy(),
            truncate(&card.question, 38)
        );
    }
}

// Counts characters, not bytes, so multibyte text never splits mid-char
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_empty_string() {
            assert_eq!(truncate("", 10), "");
        }

        #[test]
        fn truncate_multibyte_on_char_boundary() {
            let question = "な".repeat(20);
            assert_eq!(truncate(&question, 10), format!("{}...", "な".repeat(7)));
        }

        #[test]
        fn truncate_multibyte_short_enough_is_unchanged() {
            // 14 chars (42 bytes) fits within a 40-char limit
            let question = "な".repeat(14);
            assert_eq!(truncate(&question, 40), question);
        }

        #[test]
        fn truncate_tiny_max_len_does_not_underflow() {
            assert_eq!(truncate("hello", 2), "...");
            assert_eq!(truncate("hello", 0), "...");
        }
    }

    mod parse_outcome_tests {
        use super::*;

        #[test]
        fn correct_variants() {
            for v in ["correct", "c", "YES", "y", "right", "1"] {
                assert_eq!(parse_outcome(v), Some(true), "for '{}'", v);
            }
        }

        #[test]
        fn incorrect_variants() {
            for v in ["incorrect", "wrong", "i", "NO", "n", "0"] {
                assert_eq!(parse_outcome(v), Some(false), "for '{}'", v);
            }
        }

        #[test]
        fn invalid_returns_none() {
            assert_eq!(parse_outcome("sorta"), None);
            assert_eq!(parse_outcome(""), None);
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["mastery", "init"]).unwrap();
            assert!(!cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_init_with_json() {
            let cli = Cli::try_parse_from(["mastery", "--json", "init"]).unwrap();
            assert!(cli.json);
        }

        #[test]
        fn parse_task_complete() {
            let cli = Cli::try_parse_from(["mastery", "task", "complete"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Task(TaskCommands::Complete)
            ));
        }

        #[test]
        fn parse_card_add_full() {
            let cli = Cli::try_parse_from([
                "mastery",
                "card",
                "add",
                "What is 7 x 8?",
                "56",
                "--subject",
                "math",
                "--difficulty",
                "easy",
            ])
            .unwrap();
            match cli.command {
                Commands::Card(CardCommands::Add {
                    question,
                    answer,
                    subject,
                    difficulty,
                }) => {
                    assert_eq!(question, "What is 7 x 8?");
                    assert_eq!(answer, "56");
                    assert_eq!(subject, "math");
                    assert_eq!(difficulty, "easy");
                }
                _ => panic!("Expected Card Add command"),
            }
        }

        #[test]
        fn parse_card_due_with_subject_short() {
            let cli = Cli::try_parse_from(["mastery", "card", "due", "-s", "history"]).unwrap();
            match cli.command {
                Commands::Card(CardCommands::Due { subject }) => {
                    assert_eq!(subject, Some("history".to_string()));
                }
                _ => panic!("Expected Card Due command"),
            }
        }

        #[test]
        fn parse_card_review() {
            let cli =
                Cli::try_parse_from(["mastery", "card", "review", "7", "--outcome", "correct"])
                    .unwrap();
            match cli.command {
                Commands::Card(CardCommands::Review { id, outcome }) => {
                    assert_eq!(id, 7);
                    assert_eq!(outcome, "correct");
                }
                _ => panic!("Expected Card Review command"),
            }
        }

        #[test]
        fn parse_card_delete_and_accuracy() {
            let cli = Cli::try_parse_from(["mastery", "card", "delete", "5"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Card(CardCommands::Delete { id: 5 })
            ));

            let cli = Cli::try_parse_from(["mastery", "card", "accuracy", "5"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Card(CardCommands::Accuracy { id: 5 })
            ));
        }

        #[test]
        fn parse_stats_command() {
            let cli = Cli::try_parse_from(["mastery", "stats"]).unwrap();
            assert!(matches!(cli.command, Commands::Stats));
        }

        #[test]
        fn parse_config_flag_global() {
            let cli =
                Cli::try_parse_from(["mastery", "--config", "/tmp/cfg.json", "stats"]).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("/tmp/cfg.json")));
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["mastery", "invalid"]).is_err());
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            // card add requires question, answer, subject, difficulty
            assert!(Cli::try_parse_from(["mastery", "card", "add", "q"]).is_err());

            // review requires id and outcome
            assert!(Cli::try_parse_from(["mastery", "card", "review", "1"]).is_err());
        }
    }
}
