//! Session Orchestrator
//!
//! Sequences one page session: index load, skeleton render, parallel preload,
//! full render, then hands the remaining categories to the viewport trigger.
//! If the index cannot be loaded it falls back to the legacy consolidated
//! dataset; if that fails too the session ends in a terminal error.
//!
//! ```text
//! INIT -> INDEX_LOADING -> SKELETON_RENDERED -> PRELOADING -> READY
//!                       \-> FALLBACK_LOADING -> READY
//!                                            \-> ERROR
//! ```

use crate::cache::CacheStore;
use crate::config::LinknavConfig;
use crate::error::LoadError;
use crate::loader::{CategoryLoader, IndexLoader, LoadedTable, SourcePaths};
use crate::merge::{merge, merge_with_failures, MergedView};
use crate::render::Renderer;
use crate::transport::Transport;
use crate::types::{CategoryID, Fragment, Index};
use crate::viewport::{SectionId, ViewportTrigger, DEFAULT_ROOT_MARGIN_PX};
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Page-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    IndexLoading,
    SkeletonRendered,
    Preloading,
    FallbackLoading,
    Ready,
    Error,
}

/// Which data source the session ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Split index with per-category fragments and lazy loading.
    Split,
    /// Single consolidated dataset; nothing left to load.
    Legacy,
}

/// Result of a successful initial load.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub mode: SessionMode,
    pub preloaded: Vec<CategoryID>,
    pub preload_failures: Vec<(CategoryID, LoadError)>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub paths: SourcePaths,
    pub root_margin_px: f64,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            paths: SourcePaths::default(),
            root_margin_px: DEFAULT_ROOT_MARGIN_PX,
        }
    }
}

impl From<&LinknavConfig> for OrchestratorOptions {
    fn from(config: &LinknavConfig) -> Self {
        Self {
            paths: config.source.paths(),
            root_margin_px: config.viewport.root_margin_px,
        }
    }
}

pub struct Orchestrator {
    index_loader: IndexLoader,
    loader: CategoryLoader,
    renderer: Arc<dyn Renderer>,
    options: OrchestratorOptions,
    state: RwLock<SessionState>,
    index: RwLock<Option<Arc<Index>>>,
    legacy: RwLock<Option<Arc<MergedView>>>,
    trigger: RwLock<Option<Arc<ViewportTrigger>>>,
    outcome: OnceCell<Result<SessionOutcome, LoadError>>,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<CacheStore>,
        renderer: Arc<dyn Renderer>,
        options: OrchestratorOptions,
    ) -> Self {
        let index_loader = IndexLoader::new(Arc::clone(&transport), options.paths.clone());
        let loader = CategoryLoader::new(transport, cache, options.paths.clone());
        Self {
            index_loader,
            loader,
            renderer,
            options,
            state: RwLock::new(SessionState::Init),
            index: RwLock::new(None),
            legacy: RwLock::new(None),
            trigger: RwLock::new(None),
            outcome: OnceCell::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn mode(&self) -> Option<SessionMode> {
        match self.outcome.get() {
            Some(Ok(outcome)) => Some(outcome.mode),
            _ => None,
        }
    }

    pub fn loader(&self) -> &CategoryLoader {
        &self.loader
    }

    pub fn trigger(&self) -> Option<Arc<ViewportTrigger>> {
        self.trigger.read().clone()
    }

    /// Current merged snapshot, if the session has data.
    pub fn merged_view(&self) -> Option<MergedView> {
        if let Some(legacy) = self.legacy.read().as_ref() {
            return Some(legacy.as_ref().clone());
        }
        let index = self.index.read().clone()?;
        Some(self.current_view(&index))
    }

    /// Run the initial load. Runs once per session; later calls return the
    /// first result without touching the network.
    pub async fn run(&self) -> Result<SessionOutcome, LoadError> {
        if self.outcome.initialized() {
            debug!("Session already started, returning previous outcome");
        }
        self.outcome
            .get_or_init(|| self.run_tiers())
            .await
            .clone()
    }

    async fn run_tiers(&self) -> Result<SessionOutcome, LoadError> {
        self.transition(SessionState::IndexLoading);

        let index_error = match self.index_loader.load_index().await {
            Ok(index) => return Ok(self.run_split(Arc::new(index)).await),
            Err(e) => e,
        };
        warn!(error = %index_error, "Split index unavailable, trying legacy dataset");

        self.transition(SessionState::FallbackLoading);
        match self.index_loader.load_legacy().await {
            Ok(catalog) => {
                let view = Arc::new(MergedView::from_catalog(catalog));
                self.renderer.render_full(&view);
                *self.legacy.write() = Some(view);
                self.transition(SessionState::Ready);
                Ok(SessionOutcome {
                    mode: SessionMode::Legacy,
                    preloaded: Vec::new(),
                    preload_failures: Vec::new(),
                })
            }
            Err(fallback_error) => {
                self.transition(SessionState::Error);
                let err = LoadError::AllSourcesExhausted {
                    index: index_error.to_string(),
                    fallback: fallback_error.to_string(),
                };
                error!(error = %err, "No data source could be loaded");
                self.renderer.render_error(err.kind(), &self.exhausted_message());
                Err(err)
            }
        }
    }

    async fn run_split(&self, index: Arc<Index>) -> SessionOutcome {
        self.loader.set_index(Arc::clone(&index));
        *self.index.write() = Some(Arc::clone(&index));

        self.renderer
            .render_skeleton(&merge(&index, &LoadedTable::new()));
        self.transition(SessionState::SkeletonRendered);

        self.transition(SessionState::Preloading);
        let preload_ids = index.preload_ids();
        let results = join_all(
            preload_ids
                .iter()
                .map(|id| self.loader.load_category(id, true)),
        )
        .await;

        let mut preloaded = Vec::new();
        let mut preload_failures = Vec::new();
        for (id, result) in preload_ids.into_iter().zip(results) {
            match result {
                Ok(_) => preloaded.push(id),
                Err(e) => {
                    warn!(category_id = %id, error = %e, "Preload failed, leaving stub");
                    preload_failures.push((id, e));
                }
            }
        }

        self.renderer
            .render_full(&self.current_view(&index));
        self.install_trigger(&index);
        self.transition(SessionState::Ready);

        SessionOutcome {
            mode: SessionMode::Split,
            preloaded,
            preload_failures,
        }
    }

    fn install_trigger(&self, index: &Arc<Index>) {
        let pending: Vec<SectionId> = index
            .categories
            .iter()
            .enumerate()
            .filter(|(_, category)| !self.loader.is_loaded(&category.id))
            .flat_map(|(position, _)| SectionId::for_category(index, position))
            .collect();

        let trigger = Arc::new(ViewportTrigger::new(
            self.loader.clone(),
            Arc::clone(&self.renderer),
            Arc::clone(index),
            self.options.root_margin_px,
        ));
        trigger.start(pending);
        *self.trigger.write() = Some(trigger);
    }

    /// User navigated to a category (e.g. a menu click). Loads it, retrying a
    /// previous failure, and renders the update. Legacy sessions answer from
    /// the consolidated data without I/O.
    pub async fn navigate(&self, category_id: &str) -> Result<Arc<Fragment>, LoadError> {
        if let Some(legacy) = self.legacy.read().as_ref() {
            return legacy
                .category(category_id)
                .map(|category| Arc::new(category.to_fragment()))
                .ok_or_else(|| LoadError::UnknownCategory(category_id.to_string()));
        }

        // A load already in flight is rendered by whoever started it.
        let already_handled =
            self.loader.is_loaded(category_id) || self.loader.is_in_flight(category_id);
        match self.loader.load_category(category_id, true).await {
            Ok(fragment) => {
                if !already_handled && self.is_observing() {
                    self.renderer
                        .render_category_update(category_id, &fragment);
                }
                Ok(fragment)
            }
            Err(e) => {
                warn!(category_id, error = %e, "Navigation load failed");
                let fetch_failed = matches!(e, LoadError::CategoryFetchFailed { .. });
                if fetch_failed && !already_handled && self.is_observing() {
                    self.renderer.render_category_unavailable(category_id, e.kind());
                }
                Err(e)
            }
        }
    }

    /// Page teardown: stop scheduling new loads. In-flight loads complete and
    /// are dropped.
    pub fn teardown(&self) {
        if let Some(trigger) = self.trigger.read().as_ref() {
            trigger.stop();
        }
        info!("Session torn down");
    }

    /// Index merged with the loaded table; failed categories are unavailable.
    fn current_view(&self, index: &Index) -> MergedView {
        merge_with_failures(index, &self.loader.snapshot(), &self.loader.failed_ids())
    }

    fn is_observing(&self) -> bool {
        self.trigger
            .read()
            .as_ref()
            .map(|trigger| trigger.is_active())
            .unwrap_or(false)
    }

    fn exhausted_message(&self) -> String {
        let paths = &self.options.paths;
        format!(
            "Directory data could not be loaded. Make sure {} or {} exists and is well-formed, then reload the page.",
            paths.index_path(),
            paths.legacy_path()
        )
    }

    fn transition(&self, next: SessionState) {
        let previous = std::mem::replace(&mut *self.state.write(), next);
        info!(from = ?previous, to = ?next, "Session state transition");
    }
}
