//! File export for generated materials
//!
//! Exports serialize in-memory data to timestamped files in a target
//! directory. Failures are logged and reported as a boolean; they are never
//! propagated, since a failed export must not take down the session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::materials::{Flashcard, QuizQuestion};

/// Markdown decoration characters stripped for the plain-text flavor
static MARKDOWN_DECORATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*_`]").unwrap());

/// Output format for notes export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotesFormat {
    /// Raw markdown
    #[default]
    Markdown,
    /// Markdown rendered to HTML, written with a .pdf name for viewers
    /// that accept it (mirrors the web app's behavior)
    Pdf,
    /// Plain text with markdown decoration stripped
    Txt,
}

impl NotesFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }
}

impl std::str::FromStr for NotesFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "pdf" => Ok(Self::Pdf),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(format!("Unknown format: {}. Options: md, pdf, txt", s)),
        }
    }
}

/// Export notes in the requested format; returns whether it succeeded
pub fn export_notes(notes: &str, format: NotesFormat, dir: &Path) -> bool {
    report("notes", try_export_notes(notes, format, dir))
}

/// Export flashcards as `Q:`/`A:` blocks; returns whether it succeeded
pub fn export_flashcards(cards: &[Flashcard], dir: &Path) -> bool {
    report("flashcards", try_export_flashcards(cards, dir))
}

/// Export quiz questions with their answer key; returns whether it succeeded
pub fn export_quiz(quiz: &[QuizQuestion], dir: &Path) -> bool {
    report("quiz", try_export_quiz(quiz, dir))
}

fn report(what: &str, result: Result<PathBuf>) -> bool {
    match result {
        Ok(path) => {
            tracing::info!(?path, "Exported {}", what);
            true
        }
        Err(e) => {
            tracing::error!("Failed to export {}: {:#}", what, e);
            false
        }
    }
}

fn try_export_notes(notes: &str, format: NotesFormat, dir: &Path) -> Result<PathBuf> {
    let content = match format {
        NotesFormat::Markdown => notes.to_string(),
        NotesFormat::Pdf => render_html(notes),
        NotesFormat::Txt => MARKDOWN_DECORATION.replace_all(notes, "").into_owned(),
    };

    write_export(dir, "notes", format.extension(), &content)
}

fn try_export_flashcards(cards: &[Flashcard], dir: &Path) -> Result<PathBuf> {
    let content = cards
        .iter()
        .map(|card| format!("Q: {}\nA: {}\n---", card.question, card.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    write_export(dir, "flashcards", "txt", &content)
}

fn try_export_quiz(quiz: &[QuizQuestion], dir: &Path) -> Result<PathBuf> {
    let content = quiz
        .iter()
        .map(|q| {
            let options = q
                .options
                .iter()
                .enumerate()
                .map(|(i, opt)| format!("{}. {}", i + 1, opt))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Q: {}\n{}\nCorrect: {}\n---", q.question, options, q.correct_answer)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    write_export(dir, "quiz", "txt", &content)
}

fn write_export(dir: &Path, stem: &str, extension: &str, content: &str) -> Result<PathBuf> {
    let filename = format!("{}-{}.{}", stem, Utc::now().timestamp_millis(), extension);
    let path = dir.join(filename);

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export to {:?}", path))?;

    Ok(path)
}

fn render_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
