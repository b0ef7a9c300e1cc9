//! Index and Category Loaders
//!
//! `IndexLoader` fetches whole-document resources (the manifest and the
//! legacy consolidated dataset). `CategoryLoader` owns the Loaded-Category
//! Table and the in-flight map and is the only writer of either.

mod category;
mod index;

pub use category::{CategoryLoader, CategoryState, LoadedTable};
pub use index::IndexLoader;

use crate::transport::join_path;

/// Site-relative locations of the data resources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePaths {
    /// Directory holding the index and fragments.
    pub data_dir: String,
    /// Index file name, relative to `data_dir`.
    pub index_file: String,
    /// Legacy consolidated dataset, relative to the site root.
    pub legacy_file: String,
}

impl SourcePaths {
    pub fn index_path(&self) -> String {
        join_path(&self.data_dir, &self.index_file)
    }

    pub fn fragment_path(&self, file: &str) -> String {
        join_path(&self.data_dir, file)
    }

    pub fn legacy_path(&self) -> String {
        self.legacy_file.clone()
    }
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            index_file: "index.json".to_string(),
            legacy_file: "data.json".to_string(),
        }
    }
}
