//! Session state definitions

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the append-only chat transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id
    pub id: String,
    /// Message text
    pub content: String,
    /// Author
    pub role: ChatRole,
    /// Epoch milliseconds at creation
    pub timestamp: i64,
}

impl ChatMessage {
    /// Create a message stamped with a fresh id and the current time
    pub fn new(content: impl Into<String>, role: ChatRole) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// A user-defined study goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique goal id
    pub id: String,
    /// What the user wants to achieve
    pub description: String,
    /// When they want it done
    pub target_date: NaiveDate,
    /// Whether it is done
    pub completed: bool,
}

impl Goal {
    /// Create an open goal
    pub fn new(description: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            target_date,
            completed: false,
        }
    }
}

/// Study progress counters for the session
///
/// The completed-flashcard count is derived from the reviewed list rather
/// than tracked separately, so the two cannot drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyProgress {
    /// Accumulated study time in seconds
    pub study_time: f64,

    /// Flashcard ids (positional indices as strings) reviewed this session,
    /// de-duplicated, in first-review order
    pub reviewed_flashcards: Vec<String>,

    /// Goals for this session
    pub study_goals: Vec<Goal>,
}

impl StudyProgress {
    /// Number of flashcards reviewed at least once
    pub fn completed_flashcards(&self) -> usize {
        self.reviewed_flashcards.len()
    }

    /// Record a review; returns false if the card was already reviewed
    pub fn mark_reviewed(&mut self, id: &str) -> bool {
        if self.reviewed_flashcards.iter().any(|r| r == id) {
            return false;
        }
        self.reviewed_flashcards.push(id.to_string());
        true
    }

    /// Add accumulated study time
    pub fn add_study_time(&mut self, seconds: f64) {
        self.study_time += seconds;
    }
}

/// Phase of an in-flight generation, surfaced for progress display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationStep {
    /// No generation has run yet
    #[default]
    Idle,
    /// Writing comprehensive notes
    Notes,
    /// Creating quiz questions
    Quiz,
    /// Preparing flashcards
    Flashcards,
    /// Materials installed
    Ready,
}

impl GenerationStep {
    /// Human-readable label for progress display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Waiting",
            Self::Notes => "Generating comprehensive notes",
            Self::Quiz => "Creating quiz questions",
            Self::Flashcards => "Preparing flashcards",
            Self::Ready => "Ready",
        }
    }
}
