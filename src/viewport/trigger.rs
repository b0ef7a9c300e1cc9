use super::{SectionId, SectionLayout, Viewport};
use crate::error::LoadError;
use crate::loader::{CategoryLoader, CategoryState};
use crate::render::Renderer;
use crate::types::{CategoryID, Index};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened when a section became (near-)visible.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Observation has stopped.
    Inactive,
    NotObserved(SectionId),
    /// Section index has no category in the index.
    UnknownSection(SectionId),
    AlreadyLoaded(CategoryID),
    InFlight(CategoryID),
    /// Earlier load failed; only an explicit navigation retries it.
    PreviouslyFailed(CategoryID),
    Loaded(CategoryID),
    Failed { category_id: CategoryID, error: LoadError },
    /// Load finished after `stop()`; result kept, render skipped.
    Discarded(CategoryID),
}

/// On-demand loader for sections entering the proximity margin.
///
/// Lifecycle is explicit: `start(sections)` begins observation, `stop()` ends
/// it. Visibility is fed in as events (`section_visible`, `on_scroll`) so
/// callers decide where layout information comes from.
pub struct ViewportTrigger {
    loader: CategoryLoader,
    renderer: Arc<dyn Renderer>,
    index: Arc<Index>,
    root_margin_px: f64,
    observed: RwLock<BTreeSet<SectionId>>,
    active: AtomicBool,
}

impl ViewportTrigger {
    pub fn new(
        loader: CategoryLoader,
        renderer: Arc<dyn Renderer>,
        index: Arc<Index>,
        root_margin_px: f64,
    ) -> Self {
        Self {
            loader,
            renderer,
            index,
            root_margin_px,
            observed: RwLock::new(BTreeSet::new()),
            active: AtomicBool::new(false),
        }
    }

    /// Begin (or extend) observation of `sections`.
    pub fn start(&self, sections: impl IntoIterator<Item = SectionId>) {
        let mut observed = self.observed.write();
        observed.extend(sections);
        self.active.store(true, Ordering::SeqCst);
        info!(sections = observed.len(), "Viewport observation started");
    }

    /// Stop observing. Loads already running finish but are not rendered.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.observed.write().clear();
        info!("Viewport observation stopped");
    }

    /// False before `start` and after `stop`.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Sections still waiting for their category, in layout order.
    pub fn observed_sections(&self) -> Vec<SectionId> {
        self.observed.read().iter().copied().collect()
    }

    pub fn root_margin_px(&self) -> f64 {
        self.root_margin_px
    }

    /// Observed sections within the proximity margin of `viewport`.
    pub fn sections_near(&self, viewport: &Viewport, layout: &[SectionLayout]) -> Vec<SectionId> {
        let observed = self.observed.read();
        layout
            .iter()
            .filter(|entry| observed.contains(&entry.section))
            .filter(|entry| entry.is_near(viewport, self.root_margin_px))
            .map(|entry| entry.section)
            .collect()
    }

    /// Handle a scroll/resize: load every category with a section near the
    /// viewport, one load per category, concurrently.
    pub async fn on_scroll(
        &self,
        viewport: &Viewport,
        layout: &[SectionLayout],
    ) -> Vec<TriggerOutcome> {
        let mut seen_categories = HashSet::new();
        let sections: Vec<SectionId> = self
            .sections_near(viewport, layout)
            .into_iter()
            .filter(|section| seen_categories.insert(section.category_index))
            .collect();

        join_all(sections.into_iter().map(|section| self.section_visible(section))).await
    }

    /// A section entered the proximity margin.
    pub async fn section_visible(&self, section: SectionId) -> TriggerOutcome {
        if !self.is_active() {
            return TriggerOutcome::Inactive;
        }
        if !self.observed.read().contains(&section) {
            return TriggerOutcome::NotObserved(section);
        }
        let Some(category) = self.index.categories.get(section.category_index) else {
            return TriggerOutcome::UnknownSection(section);
        };
        let category_id = category.id.clone();

        match self.loader.state(&category_id) {
            CategoryState::Loaded => {
                self.unobserve_category(section.category_index);
                return TriggerOutcome::AlreadyLoaded(category_id);
            }
            CategoryState::Loading => return TriggerOutcome::InFlight(category_id),
            CategoryState::LoadFailed => return TriggerOutcome::PreviouslyFailed(category_id),
            CategoryState::Stub => {}
        }

        debug!(category_id = %category_id, section = %section, "Section near viewport, loading");
        let result = self.loader.load_category(&category_id, true).await;

        if !self.is_active() {
            debug!(category_id = %category_id, "Discarding load completed after teardown");
            return TriggerOutcome::Discarded(category_id);
        }

        match result {
            Ok(fragment) => {
                self.unobserve_category(section.category_index);
                self.renderer.render_category_update(&category_id, &fragment);
                TriggerOutcome::Loaded(category_id)
            }
            Err(error) => {
                warn!(category_id = %category_id, error = %error, "Lazy load failed, marking unavailable");
                self.renderer
                    .render_category_unavailable(&category_id, error.kind());
                TriggerOutcome::Failed { category_id, error }
            }
        }
    }

    fn unobserve_category(&self, category_index: usize) {
        self.observed
            .write()
            .retain(|section| section.category_index != category_index);
    }
}
