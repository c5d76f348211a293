//! Parser for the delimiter-based generation response format
//!
//! The upstream contract is textual: the model is asked to emit three
//! sections (NOTES / QUIZ / FLASHCARDS) separated by `---` lines. This
//! parser splits on those delimiters and sniffs section headers by keyword.
//! It deliberately mirrors the fragility of that contract: the correct quiz
//! answer is inferred positionally from a `*` marker, and a section the
//! model forgot to emit degrades to an empty result rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Flashcard, QuizQuestion, StudyMaterials};

/// Leading "1. " style numeral prefix on a question line
static NUMERAL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").unwrap());
/// Leading "a) ".."d) " prefix on an option line
static OPTION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-d]\)\s*").unwrap());
/// Leading "Q: " prefix on a flashcard question
static FLASHCARD_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q:\s*").unwrap());

/// Parse a full generation response into structured study materials
///
/// Missing sections yield empty collections; that is the documented
/// degraded mode, logged at warn level and never an error.
pub fn parse_study_materials(content: &str) -> StudyMaterials {
    let sections = split_sections(content);

    let notes = match section_body(&sections, "notes") {
        Some(body) => body,
        None => {
            tracing::warn!("Response contained no notes section");
            String::new()
        }
    };

    let quiz = match section_body(&sections, "quiz") {
        Some(body) => parse_quiz_section(&body),
        None => {
            tracing::warn!("Response contained no quiz section");
            Vec::new()
        }
    };

    let flashcards = match section_body(&sections, "flashcards") {
        Some(body) => parse_flashcard_section(&body),
        None => {
            tracing::warn!("Response contained no flashcards section");
            Vec::new()
        }
    };

    StudyMaterials { notes, quiz, flashcards }
}

/// Parse a response that is expected to contain only flashcards
pub fn parse_flashcards_response(content: &str) -> Vec<Flashcard> {
    let sections = split_sections(content);
    match section_body(&sections, "flashcards") {
        Some(body) => parse_flashcard_section(&body),
        None => {
            tracing::warn!("Flashcard response contained no flashcards section");
            Vec::new()
        }
    }
}

/// Split the raw response on the literal `---` delimiter and trim segments
pub fn split_sections(content: &str) -> Vec<&str> {
    content.split("---").map(str::trim).collect()
}

/// Locate a section by case-insensitive keyword and return its body
///
/// The body is everything after the header line. When the model emits the
/// header alone in its own segment (header and body separated by `---`),
/// the body is the following segment.
fn section_body(sections: &[&str], keyword: &str) -> Option<String> {
    let index = sections.iter().position(|s| s.to_lowercase().contains(keyword))?;

    let section = sections[index];
    let body: String =
        section.split('\n').skip(1).collect::<Vec<_>>().join("\n");

    if body.trim().is_empty() {
        return sections.get(index + 1).map(|s| s.to_string());
    }
    Some(body)
}

/// Split a section body into blank-line-separated blocks
fn blocks(body: &str) -> impl Iterator<Item = &str> {
    body.split("\n\n").filter(|b| !b.trim().is_empty())
}

/// Parse the quiz section body into questions
pub fn parse_quiz_section(body: &str) -> Vec<QuizQuestion> {
    blocks(body).map(parse_quiz_block).collect()
}

/// Parse one question block
///
/// First line is the question (numeral prefix stripped); remaining lines are
/// options (letter prefix and `*` marker stripped). The correct answer is the
/// option at the marker line's index minus one. That positional match is part
/// of the upstream contract and drifts when the marker line does not align
/// with an option line.
fn parse_quiz_block(block: &str) -> QuizQuestion {
    let lines: Vec<&str> = block.split('\n').collect();

    let question = lines
        .first()
        .map(|l| NUMERAL_PREFIX.replace(l, "").into_owned())
        .unwrap_or_default();

    let options: Vec<String> = lines
        .iter()
        .skip(1)
        .map(|l| OPTION_PREFIX.replace(l, "").replace('*', "").trim_end().to_string())
        .collect();

    let correct_answer = lines
        .iter()
        .position(|l| l.contains('*'))
        .and_then(|marker| marker.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_default();

    QuizQuestion { question, options, correct_answer, answered: false, is_correct: false }
}

/// Parse the flashcards section body into cards
pub fn parse_flashcard_section(body: &str) -> Vec<Flashcard> {
    blocks(body).map(parse_flashcard_block).collect()
}

/// Parse one `Q: ... / A: ...` block
pub(crate) fn parse_flashcard_block(block: &str) -> Flashcard {
    let mut parts = block.split("\nA: ");
    let question_part = parts.next().unwrap_or("");
    let answer = parts.next().unwrap_or("");

    Flashcard::new(FLASHCARD_PREFIX.replace(question_part, "").into_owned(), answer)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    const FULL_RESPONSE: &str = "NOTES\n---\nHello world\n---\nQUIZ\n---\n1. 2+2?\na) 3\nb) 4*\nc) 5\n---\nFLASHCARDS\n---\nQ: Capital of France?\nA: Paris";

    #[test]
    fn full_response_end_to_end() {
        let materials = parse_study_materials(FULL_RESPONSE);

        assert_eq!(materials.notes, "Hello world");

        assert_eq!(materials.quiz.len(), 1);
        let q = &materials.quiz[0];
        assert_eq!(q.question, "2+2?");
        assert_eq!(q.options, vec!["3", "4", "5"]);
        assert_eq!(q.correct_answer, "4");
        assert!(!q.answered);

        assert_eq!(materials.flashcards.len(), 1);
        let f = &materials.flashcards[0];
        assert_eq!(f.question, "Capital of France?");
        assert_eq!(f.answer, "Paris");
        assert!(!f.reviewed);
    }

    #[test]
    fn inline_section_bodies() {
        // Header and body inside the same segment
        let content = "NOTES\nSome notes here\n---\nQUIZ\n1. Q?\na) x*\nb) y\n---\nFLASHCARDS\nQ: A?\nA: B";
        let materials = parse_study_materials(content);

        assert_eq!(materials.notes, "Some notes here");
        assert_eq!(materials.quiz.len(), 1);
        assert_eq!(materials.flashcards.len(), 1);
        assert_eq!(materials.flashcards[0].answer, "B");
    }

    #[test]
    fn block_counts_match_section_blocks() {
        let content = "NOTES\nn\n---\nQUIZ\n1. A?\na) 1*\nb) 2\n\n2. B?\na) 3\nb) 4*\n\n3. C?\na) 5*\nb) 6\n---\nFLASHCARDS\nQ: a?\nA: 1\n\nQ: b?\nA: 2";
        let materials = parse_study_materials(content);

        assert_eq!(materials.quiz.len(), 3);
        assert_eq!(materials.flashcards.len(), 2);
        assert_eq!(materials.quiz[1].correct_answer, "4");
    }

    #[test]
    fn missing_flashcards_section_degrades_to_empty() {
        let content = "NOTES\n---\nBody\n---\nQUIZ\n---\n1. Q?\na) x*\nb) y";
        let materials = parse_study_materials(content);

        assert_eq!(materials.notes, "Body");
        assert_eq!(materials.quiz.len(), 1);
        assert!(materials.flashcards.is_empty());
    }

    #[test]
    fn missing_all_sections_yields_empty_materials() {
        let materials = parse_study_materials("free-form text with no structure");
        assert_eq!(materials, StudyMaterials::default());
    }

    #[test]
    fn quiz_block_without_marker_has_empty_answer() {
        let questions = parse_quiz_section("1. Q?\na) x\nb) y");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "");
        assert_eq!(questions[0].options, vec!["x", "y"]);
    }

    #[test]
    fn quiz_marker_on_question_line_yields_empty_answer() {
        // Marker misaligned with any option line: position 0 has no
        // preceding option, so the positional match comes up empty
        let questions = parse_quiz_section("1. Which*?\na) x\nb) y");
        assert_eq!(questions[0].correct_answer, "");
    }

    #[test]
    fn flashcard_without_answer_part() {
        let cards = parse_flashcard_section("Q: Orphan question?");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "Orphan question?");
        assert_eq!(cards[0].answer, "");
    }

    #[test]
    fn flashcards_only_response() {
        let content = "FLASHCARDS\n---\nQ: a?\nA: 1\n\nQ: b?\nA: 2";
        let cards = parse_flashcards_response(content);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].question, "b?");
    }

    #[test]
    fn flashcards_response_without_header_is_empty() {
        let cards = parse_flashcards_response("Q: a?\nA: 1");
        assert!(cards.is_empty());
    }

    proptest! {
        #[test]
        fn parser_never_panics(content in ".{0,2000}") {
            let _ = parse_study_materials(&content);
        }

        #[test]
        fn quiz_length_equals_block_count(n in 1usize..8) {
            let body: Vec<String> = (0..n)
                .map(|i| format!("{}. Question {}?\na) x*\nb) y", i + 1, i))
                .collect();
            let questions = parse_quiz_section(&body.join("\n\n"));
            prop_assert_eq!(questions.len(), n);
        }
    }
}
