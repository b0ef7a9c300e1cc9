//! Rendering callback interface.
//!
//! The pipeline calls into a `Renderer`; it never knows how anything is
//! painted. Callbacks may arrive after the page is gone, so implementations
//! must tolerate late calls without failing.

use crate::error::ErrorKind;
use crate::merge::MergedView;
use crate::types::{CategoryID, Fragment};
use parking_lot::Mutex;

pub trait Renderer: Send + Sync {
    /// All-stub layout shown as soon as the index is known.
    fn render_skeleton(&self, view: &MergedView);

    /// Full view after the preload set settles, or the legacy dataset.
    fn render_full(&self, view: &MergedView);

    /// One category finished loading after the initial render.
    fn render_category_update(&self, category_id: &str, fragment: &Fragment);

    /// A category's load failed; its sections stay as "unavailable" stubs
    /// until a later load succeeds.
    fn render_category_unavailable(&self, category_id: &str, kind: ErrorKind);

    /// Terminal, page-level failure.
    fn render_error(&self, kind: ErrorKind, message: &str);
}

/// A single call received by a `RecordingRenderer`.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Skeleton(MergedView),
    Full(MergedView),
    CategoryUpdate {
        category_id: CategoryID,
        fragment: Fragment,
    },
    CategoryUnavailable {
        category_id: CategoryID,
        kind: ErrorKind,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

/// Renderer that records every callback in arrival order.
#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every callback received so far, oldest first.
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().clone()
    }

    pub fn skeletons(&self) -> Vec<MergedView> {
        self.collect(|event| match event {
            RenderEvent::Skeleton(view) => Some(view.clone()),
            _ => None,
        })
    }

    pub fn full_renders(&self) -> Vec<MergedView> {
        self.collect(|event| match event {
            RenderEvent::Full(view) => Some(view.clone()),
            _ => None,
        })
    }

    pub fn category_updates(&self) -> Vec<CategoryID> {
        self.collect(|event| match event {
            RenderEvent::CategoryUpdate { category_id, .. } => Some(category_id.clone()),
            _ => None,
        })
    }

    /// Categories reported unavailable, in call order.
    pub fn unavailable(&self) -> Vec<CategoryID> {
        self.collect(|event| match event {
            RenderEvent::CategoryUnavailable { category_id, .. } => Some(category_id.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<(ErrorKind, String)> {
        self.collect(|event| match event {
            RenderEvent::Error { kind, message } => Some((*kind, message.clone())),
            _ => None,
        })
    }

    fn collect<T>(&self, pick: impl Fn(&RenderEvent) -> Option<T>) -> Vec<T> {
        self.events.lock().iter().filter_map(pick).collect()
    }

    fn push(&self, event: RenderEvent) {
        self.events.lock().push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn render_skeleton(&self, view: &MergedView) {
        self.push(RenderEvent::Skeleton(view.clone()));
    }

    fn render_full(&self, view: &MergedView) {
        self.push(RenderEvent::Full(view.clone()));
    }

    fn render_category_update(&self, category_id: &str, fragment: &Fragment) {
        self.push(RenderEvent::CategoryUpdate {
            category_id: category_id.to_string(),
            fragment: fragment.clone(),
        });
    }

    fn render_category_unavailable(&self, category_id: &str, kind: ErrorKind) {
        self.push(RenderEvent::CategoryUnavailable {
            category_id: category_id.to_string(),
            kind,
        });
    }

    fn render_error(&self, kind: ErrorKind, message: &str) {
        self.push(RenderEvent::Error {
            kind,
            message: message.to_string(),
        });
    }
}
