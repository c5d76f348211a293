use std::path::PathBuf;

use anyhow::Result;
use benkyo::export::{self, NotesFormat};
use benkyo::openai::OpenAiClient;
use benkyo::store::{ChatRole, NoticeKind, StoreEvent, StudyStore};
use benkyo::{Config, OpenAiGenerator};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "benkyo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate study materials for a topic
    Generate {
        /// Topic to study
        topic: String,
        /// Also generate this many extra rounds of flashcards
        #[arg(long, default_value_t = 0)]
        more_flashcards: u32,
        /// Export notes, quiz and flashcards to this directory
        #[arg(short, long)]
        export: Option<PathBuf>,
        /// Notes export format
        #[arg(short, long, default_value = "md")]
        format: NotesFormat,
    },
    /// Validate the configured API credential
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "benkyo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Seed the environment from .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!("Configuration: {}", config.summary());

    match cli.command {
        Commands::Generate { topic, more_flashcards, export, format } => {
            run_generate(config, &topic, more_flashcards, export, format).await?;
        }
        Commands::Check => {
            let client = OpenAiClient::new(config.api_key.clone());
            client.test_connection().await?;
            println!("Credential OK ({})", config.summary());
        }
    }

    Ok(())
}

async fn run_generate(
    config: Config,
    topic: &str,
    more_flashcards: u32,
    export_dir: Option<PathBuf>,
    format: NotesFormat,
) -> Result<()> {
    let mut store = StudyStore::new(Box::new(OpenAiGenerator::new(config)));
    let mut events = store.subscribe();

    // Print progress and notices as the store emits them
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StoreEvent::StepChanged(step) => println!("  {}", step.label()),
                StoreEvent::Notice(notice) => match notice.kind {
                    NoticeKind::Success => println!("{}", notice.message),
                    NoticeKind::Error => eprintln!("{}", notice.message),
                },
                _ => {}
            }
        }
    });

    store.add_message(topic, ChatRole::User);
    store.generate_materials(topic).await;

    if let Some(error) = store.error() {
        anyhow::bail!("{}", error);
    }

    for _ in 0..more_flashcards {
        store.generate_more_flashcards().await;
    }

    let materials = store
        .materials()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No materials were generated"))?;
    store.add_message(materials.notes.clone(), ChatRole::Assistant);

    println!("\n{}\n", materials.notes);
    println!("Quiz: {} questions", materials.quiz.len());
    for (i, q) in materials.quiz.iter().enumerate() {
        println!("  {}. {}", i + 1, q.question);
    }
    println!("Flashcards: {} cards", materials.flashcards.len());

    if let Some(dir) = export_dir {
        std::fs::create_dir_all(&dir)?;
        let ok = export::export_notes(&materials.notes, format, &dir)
            && export::export_quiz(&materials.quiz, &dir)
            && export::export_flashcards(&materials.flashcards, &dir);
        if !ok {
            anyhow::bail!("Export failed; see log output");
        }
        println!("Exported materials to {}", dir.display());
    }

    drop(store);
    printer.await?;
    Ok(())
}
