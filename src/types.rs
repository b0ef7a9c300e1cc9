//! Core data model: the index manifest, category fragments and the legacy
//! consolidated catalog.
//!
//! Field names follow the JSON resources (camelCase on the wire).

use serde::{Deserialize, Serialize};

/// CategoryID: unique identifier of a category within the index.
pub type CategoryID = String;

/// Top-level manifest listing every category and where its fragment lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Opaque descriptive fields, passed through unmodified.
    #[serde(default)]
    pub meta: serde_json::Value,
    pub categories: Vec<CategoryRef>,
}

impl Index {
    /// Index entry for `id`.
    pub fn find(&self, id: &str) -> Option<&CategoryRef> {
        self.categories.iter().find(|cat| cat.id == id)
    }

    /// Layout position of `id`; this is the `catIndex` of its sections.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|cat| cat.id == id)
    }

    /// Ids of categories flagged for preload, in index order.
    pub fn preload_ids(&self) -> Vec<CategoryID> {
        self.categories
            .iter()
            .filter(|cat| cat.preload)
            .map(|cat| cat.id.clone())
            .collect()
    }

    /// First id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.categories
            .iter()
            .find(|cat| !seen.insert(cat.id.as_str()))
            .map(|cat| cat.id.as_str())
    }
}

/// Index entry for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: CategoryID,
    /// Fragment path, relative to the data directory.
    pub file: String,
    #[serde(default)]
    pub preload: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_icon: String,
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

/// Structural description of a sub-section, without items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub item_count: usize,
}

/// One category's full item data, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: CategoryID,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_icon: String,
    #[serde(default)]
    pub children: Vec<Child>,
}

impl Fragment {
    /// Total items across all children.
    pub fn item_count(&self) -> usize {
        self.children.iter().map(|child| child.items.len()).sum()
    }
}

/// Sub-section of a fragment with its items in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A single directory link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Legacy single-file dataset in the fully merged shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub meta: serde_json::Value,
    pub categories: Vec<CatalogCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCategory {
    /// Older datasets omit ids; see `Catalog::normalize_ids`.
    #[serde(default)]
    pub id: CategoryID,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_icon: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub children: Vec<Child>,
}

impl Catalog {
    /// Assign `category-{index}` to categories that arrived without an id.
    pub fn normalize_ids(&mut self) {
        for (position, category) in self.categories.iter_mut().enumerate() {
            if category.id.is_empty() {
                category.id = format!("category-{}", position);
            }
        }
    }
}
