//! Linknav: lazy-loading client for split link directories
//!
//! A directory is published as a small index plus one JSON fragment per
//! category. A session renders a skeleton from the index, preloads flagged
//! categories, and loads the rest as their sections approach the viewport,
//! caching fragments in a versioned persistent store. Sites that only publish
//! the older single-file dataset are served from that instead.

pub mod cache;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod orchestrator;
pub mod render;
pub mod tooling;
pub mod transport;
pub mod types;
pub mod viewport;

pub use error::{ApiError, ErrorKind, LoadError};
pub use orchestrator::{Orchestrator, OrchestratorOptions, SessionMode, SessionOutcome, SessionState};
pub use render::Renderer;
