//! Viewport Trigger
//!
//! Watches rendered category sections and loads a category's data when one of
//! its sections comes within the proximity margin of the viewport.

mod geometry;
mod trigger;

pub use geometry::{SectionLayout, Viewport};
pub use trigger::{TriggerOutcome, ViewportTrigger};

use crate::types::Index;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default distance, in pixels, outside the viewport at which loading starts.
pub const DEFAULT_ROOT_MARGIN_PX: f64 = 200.0;

/// Address of one rendered section: `section-{catIndex}-{childIndex}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionId {
    pub category_index: usize,
    pub child_index: usize,
}

impl SectionId {
    pub fn new(category_index: usize, child_index: usize) -> Self {
        Self {
            category_index,
            child_index,
        }
    }

    /// Every section of every category in `index`, in layout order. A
    /// category without children still gets one section so it can load.
    pub fn all_for(index: &Index) -> Vec<SectionId> {
        index
            .categories
            .iter()
            .enumerate()
            .flat_map(|(position, _)| Self::for_category(index, position))
            .collect()
    }

    pub fn for_category(index: &Index, category_index: usize) -> Vec<SectionId> {
        let children = index
            .categories
            .get(category_index)
            .map(|category| category.children.len())
            .unwrap_or(0);
        (0..children.max(1))
            .map(|child| SectionId::new(category_index, child))
            .collect()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section-{}-{}", self.category_index, self.child_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid section id: {0}")]
pub struct ParseSectionIdError(String);

impl FromStr for SectionId {
    type Err = ParseSectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSectionIdError(s.to_string());
        let rest = s.strip_prefix("section-").ok_or_else(invalid)?;
        let (category, child) = rest.split_once('-').ok_or_else(invalid)?;
        Ok(SectionId {
            category_index: category.parse().map_err(|_| invalid())?,
            child_index: child.parse().map_err(|_| invalid())?,
        })
    }
}
