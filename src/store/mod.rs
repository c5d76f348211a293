//! Session state store
//!
//! Single source of truth for one study session. The store owns all
//! application-visible state, exposes action methods that mutate it, and
//! notifies subscribers through channels. It is an owned value passed to its
//! caller, not a process-wide global, and it talks to the upstream API only
//! through the injected [`MaterialsGenerator`], so every transition can be
//! exercised without a network.

pub mod state;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::materials::{MaterialsGenerator, StudyMaterials};

pub use state::{ChatMessage, ChatRole, GenerationStep, Goal, StudyProgress};

/// Store-level errors for actions that require prior state
#[derive(Debug, Error)]
pub enum StoreError {
    /// An action requiring generated materials ran before any generation
    #[error("No study materials yet. Generate a topic first")]
    NoMaterials,
}

/// Severity of a transient user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient user-facing notice (the UI's toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Display text
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

/// Events emitted to subscribers when the store changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Generation moved to a new phase
    StepChanged(GenerationStep),
    /// Materials were replaced or extended
    MaterialsUpdated,
    /// A chat message was appended
    MessageAppended,
    /// Quiz or flashcard progress changed
    ProgressUpdated,
    /// A transient notice for the user
    Notice(Notice),
}

/// Handle for one generation attempt
///
/// Tickets are issued with a monotonically increasing id. A completion whose
/// ticket is no longer the newest is stale and gets discarded instead of
/// overwriting state written by a later attempt.
#[derive(Debug)]
pub struct GenerationTicket {
    id: u64,
    /// Token cancelling this attempt's network request
    pub cancel_token: CancellationToken,
}

/// The session store
pub struct StudyStore {
    generator: Box<dyn MaterialsGenerator>,

    initialized: bool,
    loading: bool,
    error: Option<String>,
    materials: Option<StudyMaterials>,
    messages: Vec<ChatMessage>,
    progress: StudyProgress,
    current_step: GenerationStep,

    /// Topic of the most recent generation, used by the flashcard follow-up
    topic: Option<String>,

    generation_seq: u64,
    current_cancel: Option<CancellationToken>,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl StudyStore {
    /// Fallback topic when extending flashcards without a recorded topic
    const CONTINUE_TOPIC: &'static str = "Continue with current topic";

    /// Create a store backed by the given generator
    pub fn new(generator: Box<dyn MaterialsGenerator>) -> Self {
        Self {
            generator,
            initialized: false,
            loading: false,
            error: None,
            materials: None,
            messages: Vec::new(),
            progress: StudyProgress::default(),
            current_step: GenerationStep::Idle,
            topic: None,
            generation_seq: 0,
            current_cancel: None,
            subscribers: Vec::new(),
        }
    }

    // --- accessors -------------------------------------------------------

    /// Whether a generation has completed successfully this session
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a generation is in flight
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last recorded error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current materials, if any
    pub fn materials(&self) -> Option<&StudyMaterials> {
        self.materials.as_ref()
    }

    /// Chat transcript, insertion order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Study progress counters
    pub fn progress(&self) -> &StudyProgress {
        &self.progress
    }

    /// Current generation phase
    pub fn current_step(&self) -> GenerationStep {
        self.current_step
    }

    // --- subscriptions ---------------------------------------------------

    /// Subscribe to store events
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn set_step(&mut self, step: GenerationStep) {
        if self.current_step != step {
            self.current_step = step;
            self.emit(StoreEvent::StepChanged(step));
        }
    }

    // --- generation ------------------------------------------------------

    /// Start a generation attempt: cancel any prior in-flight request, mark
    /// the store loading, and issue a fresh ticket
    pub fn begin_generation(&mut self, step: GenerationStep) -> GenerationTicket {
        let cancel_token = CancellationToken::new();
        if let Some(prev) = self.current_cancel.replace(cancel_token.clone()) {
            prev.cancel();
        }

        self.generation_seq += 1;
        self.loading = true;
        self.error = None;
        self.set_step(step);

        GenerationTicket { id: self.generation_seq, cancel_token }
    }

    /// Apply a generation result, unless the ticket has gone stale
    pub fn apply_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<StudyMaterials, impl std::error::Error>,
    ) {
        if ticket.id != self.generation_seq {
            tracing::debug!(ticket = ticket.id, newest = self.generation_seq,
                "Discarding stale generation result");
            return;
        }

        match result {
            Ok(mut materials) => {
                materials.reset_progress();
                self.materials = Some(materials);
                self.initialized = true;
                self.loading = false;
                self.set_step(GenerationStep::Ready);
                self.emit(StoreEvent::MaterialsUpdated);
                self.emit(StoreEvent::Notice(Notice::success(
                    "Study materials generated successfully!",
                )));
            }
            Err(e) => {
                // Prior materials stay untouched
                self.loading = false;
                self.error = Some(e.to_string());
                self.emit(StoreEvent::Notice(Notice::error("Failed to generate study materials")));
            }
        }
    }

    /// Generate a full set of study materials for a topic
    ///
    /// On success the materials are replaced wholesale with progress flags
    /// reset. On failure the error is recorded as a string and prior
    /// materials are left in place. Either way a notice event is emitted.
    pub async fn generate_materials(&mut self, topic: &str) {
        self.topic = Some(topic.to_string());
        let ticket = self.begin_generation(GenerationStep::Notes);

        self.set_step(GenerationStep::Quiz);
        let result = self.generator.generate(topic, ticket.cancel_token.clone()).await;
        self.set_step(GenerationStep::Flashcards);

        self.apply_generation(ticket, result);
    }

    /// Cancel the in-flight generation, if any
    pub fn cancel_generation(&mut self) {
        if let Some(token) = self.current_cancel.take() {
            token.cancel();
        }
        self.loading = false;
    }

    /// Generate additional flashcards and append them to current materials
    pub async fn generate_more_flashcards(&mut self) {
        let Some(existing) = self.materials.as_ref().map(|m| m.flashcards.clone()) else {
            self.error = Some(StoreError::NoMaterials.to_string());
            self.emit(StoreEvent::Notice(Notice::error(
                "Failed to generate additional flashcards",
            )));
            return;
        };

        let topic =
            self.topic.clone().unwrap_or_else(|| Self::CONTINUE_TOPIC.to_string());
        let ticket = self.begin_generation(GenerationStep::Flashcards);

        let result = self
            .generator
            .generate_more_flashcards(&topic, &existing, ticket.cancel_token.clone())
            .await;

        if ticket.id != self.generation_seq {
            tracing::debug!("Discarding stale flashcard result");
            return;
        }

        match result {
            Ok(new_cards) => {
                if let Some(materials) = self.materials.as_mut() {
                    materials.flashcards.extend(new_cards);
                }
                self.loading = false;
                self.set_step(GenerationStep::Ready);
                self.emit(StoreEvent::MaterialsUpdated);
                self.emit(StoreEvent::Notice(Notice::success("Generated additional flashcards!")));
            }
            Err(e) => {
                self.loading = false;
                self.error = Some(e.to_string());
                self.emit(StoreEvent::Notice(Notice::error(
                    "Failed to generate additional flashcards",
                )));
            }
        }
    }

    // --- transcript ------------------------------------------------------

    /// Append a chat message with a fresh id and current timestamp
    ///
    /// The transcript is unbounded; it lives only for the session.
    pub fn add_message(&mut self, content: impl Into<String>, role: ChatRole) {
        self.messages.push(ChatMessage::new(content, role));
        self.emit(StoreEvent::MessageAppended);
    }

    // --- progress --------------------------------------------------------

    /// Record a quiz answer
    ///
    /// No-op when no materials exist; an out-of-range index is ignored with
    /// a warning and must not touch any existing entry.
    pub fn update_quiz_progress(&mut self, index: usize, is_correct: bool) {
        let Some(materials) = self.materials.as_mut() else {
            return;
        };

        match materials.quiz.get_mut(index) {
            Some(question) => {
                question.answered = true;
                question.is_correct = is_correct;
                self.emit(StoreEvent::ProgressUpdated);
            }
            None => {
                tracing::warn!(index, len = materials.quiz.len(),
                    "Ignoring quiz progress update for out-of-range index");
            }
        }
    }

    /// Mark a flashcard (by positional index string) as reviewed
    ///
    /// Idempotent: repeat reviews of the same card change nothing.
    pub fn mark_flashcard_reviewed(&mut self, id: &str) {
        if self.progress.mark_reviewed(id) {
            self.emit(StoreEvent::ProgressUpdated);
        }
    }

    /// Accumulate study time
    pub fn add_study_time(&mut self, seconds: f64) {
        self.progress.add_study_time(seconds);
        self.emit(StoreEvent::ProgressUpdated);
    }

    /// Add a study goal, returning its id
    pub fn add_study_goal(
        &mut self,
        description: impl Into<String>,
        target_date: chrono::NaiveDate,
    ) -> String {
        let goal = Goal::new(description, target_date);
        let id = goal.id.clone();
        self.progress.study_goals.push(goal);
        self.emit(StoreEvent::ProgressUpdated);
        id
    }

    /// Toggle a goal's completion; returns false if the id is unknown
    pub fn toggle_study_goal(&mut self, id: &str) -> bool {
        let Some(goal) = self.progress.study_goals.iter_mut().find(|g| g.id == id) else {
            return false;
        };
        goal.completed = !goal.completed;
        self.emit(StoreEvent::ProgressUpdated);
        true
    }

    /// Record or clear an error string directly
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::materials::{Flashcard, QuizQuestion};
    use crate::openai::OpenAiError;

    /// Stub generator fed from a queue of canned results
    struct StubGenerator {
        generate_results: Mutex<VecDeque<Result<StudyMaterials, OpenAiError>>>,
        flashcard_results: Mutex<VecDeque<Result<Vec<Flashcard>, OpenAiError>>>,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                generate_results: Mutex::new(VecDeque::new()),
                flashcard_results: Mutex::new(VecDeque::new()),
            }
        }

        fn with_materials(materials: StudyMaterials) -> Box<Self> {
            let stub = Self::new();
            stub.generate_results.lock().unwrap().push_back(Ok(materials));
            Box::new(stub)
        }

        fn with_error(error: OpenAiError) -> Box<Self> {
            let stub = Self::new();
            stub.generate_results.lock().unwrap().push_back(Err(error));
            Box::new(stub)
        }
    }

    #[async_trait]
    impl MaterialsGenerator for StubGenerator {
        async fn generate(
            &self,
            _topic: &str,
            _cancel_token: CancellationToken,
        ) -> Result<StudyMaterials, OpenAiError> {
            self.generate_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(OpenAiError::EmptyResponse))
        }

        async fn generate_more_flashcards(
            &self,
            _topic: &str,
            _existing: &[Flashcard],
            _cancel_token: CancellationToken,
        ) -> Result<Vec<Flashcard>, OpenAiError> {
            self.flashcard_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(OpenAiError::EmptyResponse))
        }
    }

    fn sample_materials(notes: &str) -> StudyMaterials {
        StudyMaterials {
            notes: notes.to_string(),
            quiz: vec![QuizQuestion {
                question: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_answer: "4".to_string(),
                answered: true,
                is_correct: true,
            }],
            flashcards: vec![Flashcard {
                reviewed: true,
                ..Flashcard::new("Capital of France?", "Paris")
            }],
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn generate_success_installs_materials_with_flags_reset() {
        let mut store = StudyStore::new(StubGenerator::with_materials(sample_materials("notes")));
        let mut rx = store.subscribe();

        store.generate_materials("topic").await;

        assert!(store.initialized());
        assert!(!store.loading());
        assert!(store.error().is_none());
        assert_eq!(store.current_step(), GenerationStep::Ready);

        let materials = store.materials().unwrap();
        assert_eq!(materials.notes, "notes");
        // Progress flags reset on install even if the generator set them
        assert!(!materials.quiz[0].answered);
        assert!(!materials.flashcards[0].reviewed);

        let events = drain(&mut rx);
        assert!(events.contains(&StoreEvent::MaterialsUpdated));
        assert!(events.iter().any(|e| matches!(
            e,
            StoreEvent::Notice(Notice { kind: NoticeKind::Success, .. })
        )));
    }

    #[tokio::test]
    async fn generate_failure_records_error_and_keeps_prior_materials() {
        let stub = StubGenerator::new();
        stub.generate_results.lock().unwrap().push_back(Ok(sample_materials("first")));
        stub.generate_results.lock().unwrap().push_back(Err(OpenAiError::QuotaExceeded));
        let mut store = StudyStore::new(Box::new(stub));

        store.generate_materials("topic").await;
        assert_eq!(store.materials().unwrap().notes, "first");

        store.generate_materials("another topic").await;

        assert!(!store.loading());
        assert!(store.error().unwrap().contains("quota"));
        assert_eq!(store.materials().unwrap().notes, "first");
    }

    #[tokio::test]
    async fn generate_failure_emits_error_notice() {
        let mut store = StudyStore::new(StubGenerator::with_error(OpenAiError::EmptyResponse));
        let mut rx = store.subscribe();

        store.generate_materials("topic").await;

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            StoreEvent::Notice(Notice { kind: NoticeKind::Error, .. })
        )));
    }

    #[tokio::test]
    async fn stale_ticket_is_discarded() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));

        let first = store.begin_generation(GenerationStep::Notes);
        let second = store.begin_generation(GenerationStep::Notes);

        // Beginning a new generation cancels the previous attempt
        assert!(first.cancel_token.is_cancelled());
        assert!(!second.cancel_token.is_cancelled());

        store.apply_generation(first, Ok::<_, OpenAiError>(sample_materials("stale")));
        assert!(store.materials().is_none());
        assert!(store.loading());

        store.apply_generation(second, Ok::<_, OpenAiError>(sample_materials("fresh")));
        assert_eq!(store.materials().unwrap().notes, "fresh");
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn update_quiz_progress_marks_question() {
        let mut store = StudyStore::new(StubGenerator::with_materials(sample_materials("n")));
        store.generate_materials("topic").await;

        store.update_quiz_progress(0, true);

        let q = &store.materials().unwrap().quiz[0];
        assert!(q.answered);
        assert!(q.is_correct);
    }

    #[tokio::test]
    async fn update_quiz_progress_out_of_range_mutates_nothing() {
        let mut store = StudyStore::new(StubGenerator::with_materials(sample_materials("n")));
        store.generate_materials("topic").await;
        let before = store.materials().unwrap().clone();

        store.update_quiz_progress(99, true);

        assert_eq!(store.materials().unwrap(), &before);
    }

    #[test]
    fn update_quiz_progress_without_materials_is_noop() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));
        store.update_quiz_progress(0, true);
        assert!(store.materials().is_none());
    }

    #[test]
    fn mark_flashcard_reviewed_is_idempotent() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));

        store.mark_flashcard_reviewed("0");
        store.mark_flashcard_reviewed("0");

        assert_eq!(store.progress().reviewed_flashcards, vec!["0"]);
        assert_eq!(store.progress().completed_flashcards(), 1);
    }

    #[tokio::test]
    async fn generate_more_flashcards_requires_materials() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));
        let mut rx = store.subscribe();

        store.generate_more_flashcards().await;

        assert!(store.error().unwrap().contains("No study materials"));
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            StoreEvent::Notice(Notice { kind: NoticeKind::Error, .. })
        )));
    }

    #[tokio::test]
    async fn generate_more_flashcards_appends() {
        let stub = StubGenerator::new();
        stub.generate_results.lock().unwrap().push_back(Ok(sample_materials("n")));
        stub.flashcard_results
            .lock()
            .unwrap()
            .push_back(Ok(vec![Flashcard::new("New?", "Yes")]));
        let mut store = StudyStore::new(Box::new(stub));

        store.generate_materials("topic").await;
        assert_eq!(store.materials().unwrap().flashcards.len(), 1);

        store.generate_more_flashcards().await;

        let cards = &store.materials().unwrap().flashcards;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].question, "New?");
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[test]
    fn add_message_appends_in_order() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));

        store.add_message("hello", ChatRole::User);
        store.add_message("hi there", ChatRole::Assistant);

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[test]
    fn study_goals_lifecycle() {
        let mut store = StudyStore::new(Box::new(StubGenerator::new()));
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        let id = store.add_study_goal("Finish ownership chapter", date);
        assert!(!store.progress().study_goals[0].completed);

        assert!(store.toggle_study_goal(&id));
        assert!(store.progress().study_goals[0].completed);

        assert!(!store.toggle_study_goal("unknown-id"));
    }

    #[tokio::test]
    async fn step_transitions_are_observable() {
        let mut store = StudyStore::new(StubGenerator::with_materials(sample_materials("n")));
        let mut rx = store.subscribe();

        store.generate_materials("topic").await;

        let steps: Vec<GenerationStep> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                StoreEvent::StepChanged(step) => Some(step),
                _ => None,
            })
            .collect();

        assert_eq!(
            steps,
            vec![
                GenerationStep::Notes,
                GenerationStep::Quiz,
                GenerationStep::Flashcards,
                GenerationStep::Ready,
            ]
        );
    }
}
