//! Command-line interface for callflow.
//!
//! Provides commands for processing a stored audio or transcript object,
//! replaying a storage event, and showing the resolved configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::{ArtifactStore, HttpGateway, LocalStore};
use crate::config::ResolvedConfig;
use crate::core::{AudioHandler, InvocationOutcome, TextHandler};
use crate::domain::{SourceObject, StorageEvent};

/// callflow - Transcription and text-analytics pipeline for stored calls
#[derive(Parser, Debug)]
#[command(name = "callflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a stored audio object
    Audio {
        /// Container holding the audio
        container: String,

        /// Object key of the audio
        key: String,
    },

    /// Run text analytics over a stored normalized transcript
    Text {
        /// Container holding the transcript
        container: String,

        /// Object key of the transcript
        key: String,
    },

    /// Handle a storage event document
    Event {
        /// Path to the event JSON
        file: PathBuf,

        /// Which path to run for the event's object
        #[arg(short, long, value_enum)]
        path: PathKind,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Pipeline path to run for a source object
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathKind {
    /// Audio → transcript
    Audio,

    /// Transcript → analytics
    Text,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = crate::config::config()?;

        match self.command {
            Commands::Audio { container, key } => {
                let source = SourceObject::new(container, key);
                run_path(config, PathKind::Audio, &source).await
            }
            Commands::Text { container, key } => {
                let source = SourceObject::new(container, key);
                run_path(config, PathKind::Text, &source).await
            }
            Commands::Event { file, path } => handle_event(config, &file, path).await,
            Commands::Config => {
                show_config(config);
                Ok(())
            }
        }
    }
}

/// Run one path against the configured store and gateway
async fn run_path(config: &ResolvedConfig, kind: PathKind, source: &SourceObject) -> Result<()> {
    let store: Arc<dyn ArtifactStore> = Arc::new(LocalStore::new(&config.store_root));
    let gateway = Arc::new(HttpGateway::new(&config.gateway_url));
    let settings = config.pipeline.clone();

    let outcome = match kind {
        PathKind::Audio => AudioHandler::new(store, gateway, settings)
            .handle(source)
            .await
            .with_context(|| format!("Audio pipeline failed for {}", source))?,
        PathKind::Text => TextHandler::new(store, gateway, settings)
            .handle(source)
            .await
            .with_context(|| format!("Text pipeline failed for {}", source))?,
    };

    print_outcome(&outcome);
    Ok(())
}

async fn handle_event(config: &ResolvedConfig, file: &Path, kind: PathKind) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read event file: {}", file.display()))?;
    let event = StorageEvent::from_json(&content)?;

    match event.source() {
        Some(source) => run_path(config, kind, &source).await,
        None => {
            println!("Event has no records; nothing to do");
            Ok(())
        }
    }
}

fn print_outcome(outcome: &InvocationOutcome) {
    if let Some(job_name) = &outcome.job_name {
        let state = if outcome.job_failed { "failed" } else { "completed" };
        println!("Job:     {} ({})", job_name, state);
    }

    for write in &outcome.report.outcomes {
        match &write.error {
            None => println!("  ✓ {} ({} bytes)", write.destination, write.size_bytes),
            Some(e) => println!("  ✗ {}: {}", write.destination, e),
        }
    }

    println!("{}", outcome.status);
}

fn show_config(config: &ResolvedConfig) {
    println!("Home:         {}", config.home.display());
    println!("Store root:   {}", config.store_root.display());
    println!("Gateway:      {}", config.gateway_url);
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none, using defaults)"),
    }

    let pipeline = &config.pipeline;
    println!();
    println!("Media URI base:     {}", pipeline.media_uri_base);
    println!(
        "Speech:             {} / {} / speakers={} (max {}) / vocabulary={}",
        pipeline.speech.language_code,
        pipeline.speech.media_format,
        pipeline.speech.speaker_labels_enabled,
        pipeline.speech.max_speakers,
        pipeline.speech.vocabulary_name.as_deref().unwrap_or("-"),
    );
    println!("Text language:      {}", pipeline.text_language);
    println!(
        "Polling:            every {}ms, up to {} reads",
        pipeline.poll.interval_ms, pipeline.poll.max_attempts
    );
    println!("Invocation timeout: {}s", pipeline.invocation_timeout_seconds);
}
