//! Study material data model

use serde::{Deserialize, Serialize};

/// One batch of generated study materials
///
/// Produced atomically by a single generation call and replaced wholesale on
/// regeneration; only the explicit "generate more flashcards" path appends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudyMaterials {
    /// Markdown notes, verbatim from the model
    pub notes: String,
    /// Multiple-choice questions, in response order
    pub quiz: Vec<QuizQuestion>,
    /// Flashcards, in response order
    pub flashcards: Vec<Flashcard>,
}

impl StudyMaterials {
    /// Reset per-item progress flags, as done when installing fresh materials
    pub fn reset_progress(&mut self) {
        for q in &mut self.quiz {
            q.answered = false;
            q.is_correct = false;
        }
        for f in &mut self.flashcards {
            f.reviewed = false;
        }
    }
}

/// A multiple-choice quiz question
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    /// Question text
    pub question: String,
    /// Answer options (no fixed length, typically four)
    pub options: Vec<String>,
    /// The correct option's text. Inferred positionally from the response's
    /// `*` marker, so it can misalign; presence in `options` is not checked.
    pub correct_answer: String,
    /// Whether the user has answered this question
    #[serde(default)]
    pub answered: bool,
    /// Whether the recorded answer was correct
    #[serde(default)]
    pub is_correct: bool,
}

/// A question/answer flashcard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    /// Front of the card
    pub question: String,
    /// Back of the card
    pub answer: String,
    /// Whether the user has reviewed this card
    #[serde(default)]
    pub reviewed: bool,
}

impl Flashcard {
    /// Create an unreviewed card
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into(), reviewed: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_progress_clears_flags() {
        let mut materials = StudyMaterials {
            notes: "n".to_string(),
            quiz: vec![QuizQuestion {
                question: "q".to_string(),
                options: vec!["a".to_string()],
                correct_answer: "a".to_string(),
                answered: true,
                is_correct: true,
            }],
            flashcards: vec![Flashcard { reviewed: true, ..Flashcard::new("q", "a") }],
        };

        materials.reset_progress();

        assert!(!materials.quiz[0].answered);
        assert!(!materials.quiz[0].is_correct);
        assert!(!materials.flashcards[0].reviewed);
    }
}
