//! Study-material generation: data model, prompts, response parsing,
//! and the generator seam the session store depends on.

pub mod generator;
pub mod model;
pub mod parser;
pub mod prompt;

pub use generator::{MaterialsGenerator, OpenAiGenerator};
pub use model::{Flashcard, QuizQuestion, StudyMaterials};
