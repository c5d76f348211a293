//! Prompt construction for study-material generation

use super::model::Flashcard;

/// System instruction for the main generation call
pub const GENERATE_SYSTEM: &str = "You are an expert tutor. Generate comprehensive study \
materials about the given topic. Include detailed notes in markdown format, quiz questions \
with multiple choice answers, and flashcards for key concepts.";

/// System instruction for the follow-up flashcards call
pub const MORE_FLASHCARDS_SYSTEM: &str = "Generate additional flashcards for the given \
topic, avoiding duplicates with existing flashcards.";

/// User instruction for the main generation call
///
/// Requests the three-section `---` delimited layout the parser expects.
pub fn generate_user(topic: &str) -> String {
    format!(
        "Generate study materials for: {topic}. Include:\n\
         1. Detailed notes with markdown formatting\n\
         2. At least 5 multiple choice questions, each as a numbered question \
         followed by options a) to d), with a * marking the correct option\n\
         3. At least 5 flashcards with key concepts, each as 'Q: ...' and 'A: ...' lines\n\n\
         Format the response with --- between sections:\n\
         NOTES\n\
         ---\n\
         QUIZ\n\
         ---\n\
         FLASHCARDS"
    )
}

/// User instruction for the follow-up flashcards call
pub fn more_flashcards_user(topic: &str, existing: &[Flashcard]) -> String {
    let existing_text = existing
        .iter()
        .map(|f| format!("Q: {}\nA: {}", f.question, f.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Generate 5 more flashcards for: {topic}\n\n\
         Format the response as a FLASHCARDS section with 'Q: ...' and 'A: ...' lines.\n\n\
         Existing flashcards:\n{existing_text}"
    )
}
