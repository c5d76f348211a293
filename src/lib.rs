//! Benkyo - a CLI study companion powered by OpenAI
//!
//! Benkyo turns any topic into study materials: markdown notes, multiple
//! choice quiz questions, and flashcards, generated through one chat
//! completion call and tracked in an in-memory session store.

pub mod config;
pub mod export;
pub mod materials;
pub mod openai;
pub mod store;

pub use config::Config;
pub use materials::{OpenAiGenerator, StudyMaterials};
pub use store::StudyStore;
