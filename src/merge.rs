//! Merge Engine
//!
//! Combines the index with whatever fragments have loaded so far into one
//! rendering-ready view. Pure: no I/O, inputs are never mutated, and the same
//! inputs always produce the same view.
//!
//! Category order always follows the index. Item order within a loaded
//! fragment is the fragment's own order. Categories without a fragment become
//! stubs that keep their child names and icons with empty item lists; stubs
//! whose load failed are marked unavailable.

use crate::loader::LoadedTable;
use crate::types::{CategoryID, CategoryRef, Catalog, Child, Fragment, Index, Item};
use serde::Serialize;
use std::collections::HashSet;

/// Rendering snapshot of the whole directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedView {
    pub meta: serde_json::Value,
    pub categories: Vec<MergedCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCategory {
    pub id: CategoryID,
    pub parent_name: String,
    pub parent_icon: String,
    pub hidden: bool,
    /// False for stubs.
    pub loaded: bool,
    /// Stub whose last load attempt failed.
    pub unavailable: bool,
    pub children: Vec<MergedChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedChild {
    pub name: String,
    pub icon: String,
    /// Expected number of items; from the index for stubs.
    pub item_count: usize,
    pub items: Vec<Item>,
}

/// Build the merged view for `index` given the loaded fragments.
pub fn merge(index: &Index, loaded: &LoadedTable) -> MergedView {
    merge_with_failures(index, loaded, &HashSet::new())
}

/// Like `merge`, marking stubs listed in `failed` as unavailable. A loaded
/// fragment always wins over a failure mark.
pub fn merge_with_failures(
    index: &Index,
    loaded: &LoadedTable,
    failed: &HashSet<CategoryID>,
) -> MergedView {
    let categories = index
        .categories
        .iter()
        .map(|category| match loaded.get(&category.id) {
            Some(fragment) => MergedCategory::from_fragment(category, fragment),
            None => {
                let mut stub = MergedCategory::stub(category);
                stub.unavailable = failed.contains(&category.id);
                stub
            }
        })
        .collect();

    MergedView {
        meta: index.meta.clone(),
        categories,
    }
}

impl MergedCategory {
    /// Placeholder built from the index entry alone.
    pub fn stub(category: &CategoryRef) -> Self {
        Self {
            id: category.id.clone(),
            parent_name: category.parent_name.clone(),
            parent_icon: category.parent_icon.clone(),
            hidden: category.hidden,
            loaded: false,
            unavailable: false,
            children: category
                .children
                .iter()
                .map(|child| MergedChild {
                    name: child.name.clone(),
                    icon: child.icon.clone(),
                    item_count: child.item_count,
                    items: Vec::new(),
                })
                .collect(),
        }
    }

    /// Loaded category; visibility still comes from the index entry.
    pub fn from_fragment(category: &CategoryRef, fragment: &Fragment) -> Self {
        Self {
            id: category.id.clone(),
            parent_name: fragment.parent_name.clone(),
            parent_icon: fragment.parent_icon.clone(),
            hidden: category.hidden,
            loaded: true,
            unavailable: false,
            children: fragment.children.iter().map(MergedChild::from).collect(),
        }
    }

    /// Items actually present; zero for stubs.
    pub fn item_count(&self) -> usize {
        self.children.iter().map(|child| child.items.len()).sum()
    }

    /// Fragment form of a loaded category.
    pub fn to_fragment(&self) -> Fragment {
        Fragment {
            id: self.id.clone(),
            parent_name: self.parent_name.clone(),
            parent_icon: self.parent_icon.clone(),
            children: self
                .children
                .iter()
                .map(|child| Child {
                    name: child.name.clone(),
                    icon: child.icon.clone(),
                    items: child.items.clone(),
                })
                .collect(),
        }
    }
}

impl From<&Child> for MergedChild {
    fn from(child: &Child) -> Self {
        Self {
            name: child.name.clone(),
            icon: child.icon.clone(),
            item_count: child.items.len(),
            items: child.items.clone(),
        }
    }
}

impl MergedView {
    /// Fully-loaded view of a legacy consolidated dataset.
    pub fn from_catalog(catalog: Catalog) -> Self {
        let categories = catalog
            .categories
            .into_iter()
            .map(|category| MergedCategory {
                children: category.children.iter().map(MergedChild::from).collect(),
                id: category.id,
                parent_name: category.parent_name,
                parent_icon: category.parent_icon,
                hidden: category.hidden,
                loaded: true,
                unavailable: false,
            })
            .collect();

        Self {
            meta: catalog.meta,
            categories,
        }
    }

    /// Look up a category by id.
    pub fn category(&self, id: &str) -> Option<&MergedCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Ids of categories still waiting for data, in index order.
    pub fn stub_ids(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|category| !category.loaded)
            .map(|category| category.id.as_str())
            .collect()
    }

    /// Ids of stubs whose load failed, in index order.
    pub fn unavailable_ids(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|category| category.unavailable)
            .map(|category| category.id.as_str())
            .collect()
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.categories.iter().all(|category| category.loaded)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(MergedCategory::item_count).sum()
    }
}
