//! CLI Tooling
//!
//! Command-line front end: runs a page session against a local site root or a
//! remote base URL and prints what a browser would have rendered.

use super::format::{
    format_fragment_text, format_inspection_text, format_view_text, TextRenderer,
};
use crate::cache::{CacheStorage, CacheStore, DisabledStorage, SledStorage};
use crate::config::LinknavConfig;
use crate::error::ApiError;
use crate::orchestrator::{Orchestrator, OrchestratorOptions, SessionMode, SessionOutcome};
use crate::transport::{FsTransport, HttpTransport, Transport};
use crate::viewport::SectionId;
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Linknav CLI - lazy-loading link directory client
#[derive(Parser)]
#[command(name = "linknav")]
#[command(about = "Load a split link directory the way its web page does")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Site root directory or http(s) base URL (overrides source.base)
    #[arg(long)]
    pub source: Option<String>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the initial page load and print the directory
    Load {
        /// Also load every lazily loaded category, as if scrolled through
        #[arg(long)]
        eager: bool,
        /// Report a section as visible, e.g. `section-1-0`; repeatable
        #[arg(long = "visible", value_name = "SECTION")]
        visible: Vec<SectionId>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load one category, as if picked from the menu
    Category {
        id: String,
        /// Bypass the persistent fragment cache
        #[arg(long)]
        no_cache: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Persistent fragment cache maintenance
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove every entry under the configured namespace
    Clear,
    /// Show age, version and validity of one category's entry
    Inspect { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Fold source and logging flags into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut LinknavConfig) {
        if let Some(source) = &self.source {
            config.source.base = source.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// Everything a command needs: resolved config, transport and cache.
pub struct CliContext {
    config: LinknavConfig,
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
}

impl CliContext {
    /// Open the transport and cache described by `config`.
    pub fn from_config(config: LinknavConfig) -> Result<Self, ApiError> {
        let transport: Arc<dyn Transport> = if config.source.is_remote() {
            Arc::new(HttpTransport::new(config.source.base.clone()))
        } else {
            Arc::new(FsTransport::new(config.source.base.clone()))
        };
        let storage: Arc<dyn CacheStorage> = if config.cache.enabled {
            Arc::new(SledStorage::open(&config.cache.resolve_path()?)?)
        } else {
            Arc::new(DisabledStorage)
        };
        let cache = Arc::new(CacheStore::new(storage, config.cache.settings()));
        Ok(Self::with_parts(config, transport, cache))
    }

    /// Context over explicit parts; used by tests with in-memory backends.
    pub fn with_parts(
        config: LinknavConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<CacheStore>,
    ) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    pub fn config(&self) -> &LinknavConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Load {
                eager,
                visible,
                format,
            } => self.handle_load(*eager, visible, *format).await,
            Commands::Category {
                id,
                no_cache,
                format,
            } => self.handle_category(id, *no_cache, *format).await,
            Commands::Cache { command } => self.handle_cache(command),
        }
    }

    fn session(&self, renderer: Arc<TextRenderer>) -> Orchestrator {
        Orchestrator::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.cache),
            renderer,
            OrchestratorOptions::from(&self.config),
        )
    }

    async fn handle_load(
        &self,
        eager: bool,
        visible: &[SectionId],
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let renderer = Arc::new(TextRenderer::new());
        let session = self.session(Arc::clone(&renderer));
        let outcome = session.run().await?;

        if let Some(trigger) = session.trigger() {
            let sections = if eager {
                trigger.observed_sections()
            } else {
                visible.to_vec()
            };
            if !sections.is_empty() {
                info!(sections = sections.len(), eager, "Reporting visible sections");
                join_all(
                    sections
                        .into_iter()
                        .map(|section| trigger.section_visible(section)),
                )
                .await;
            }
        }
        session.teardown();

        let view = session
            .merged_view()
            .ok_or_else(|| ApiError::Output("Session finished without data".to_string()))?;

        match format {
            OutputFormat::Json => {
                let body = json!({
                    "mode": mode_name(outcome.mode),
                    "preloaded": &outcome.preloaded,
                    "preloadFailures": failure_pairs(&outcome),
                    "view": view,
                });
                encode_json(&body)
            }
            OutputFormat::Text => {
                let mut out = renderer.take_transcript();
                out.push('\n');
                out.push_str(&format!("Mode: {}\n", mode_name(outcome.mode)));
                for (id, error) in &outcome.preload_failures {
                    out.push_str(&format!("Preload failed: {}: {}\n", id, error));
                }
                out.push('\n');
                out.push_str(&format_view_text(&view));
                Ok(out)
            }
        }
    }

    async fn handle_category(
        &self,
        id: &str,
        no_cache: bool,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let renderer = Arc::new(TextRenderer::new());
        let session = self.session(renderer);
        let outcome = session.run().await?;

        let fragment = if no_cache && outcome.mode == SessionMode::Split {
            session.loader().load_category(id, false).await?
        } else {
            session.navigate(id).await?
        };
        session.teardown();

        match format {
            OutputFormat::Json => encode_json(fragment.as_ref()),
            OutputFormat::Text => Ok(format_fragment_text(&fragment)),
        }
    }

    fn handle_cache(&self, command: &CacheCommands) -> Result<String, ApiError> {
        match command {
            CacheCommands::Clear => {
                let removed = self.cache.clear()?;
                Ok(format!(
                    "Removed {} entries under namespace {}.\n",
                    removed,
                    self.cache.settings().namespace
                ))
            }
            CacheCommands::Inspect { id } => {
                let inspection = self.cache.inspect(id)?;
                Ok(format_inspection_text(id, inspection.as_ref()))
            }
        }
    }
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Output(format!("Failed to encode output: {}", e)))
}

fn mode_name(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Split => "split",
        SessionMode::Legacy => "legacy",
    }
}

fn failure_pairs(outcome: &SessionOutcome) -> Vec<serde_json::Value> {
    outcome
        .preload_failures
        .iter()
        .map(|(id, error)| json!({"id": id, "kind": error.kind().as_str(), "error": error.to_string()}))
        .collect()
}
