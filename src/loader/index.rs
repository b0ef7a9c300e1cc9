use super::SourcePaths;
use crate::error::{LoadError, SourceError};
use crate::transport::Transport;
use crate::types::{Catalog, Index};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches the manifest and the legacy consolidated dataset. No retries here;
/// fallback policy belongs to the orchestrator.
pub struct IndexLoader {
    transport: Arc<dyn Transport>,
    paths: SourcePaths,
}

impl IndexLoader {
    pub fn new(transport: Arc<dyn Transport>, paths: SourcePaths) -> Self {
        Self { transport, paths }
    }

    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// Fetch and validate the index. Any transport, decode or uniqueness
    /// failure is `IndexUnavailable`.
    pub async fn load_index(&self) -> Result<Index, LoadError> {
        let path = self.paths.index_path();
        let index: Index = self
            .fetch_document(&path)
            .await
            .map_err(|e| LoadError::IndexUnavailable(e.to_string()))?;

        if let Some(duplicate) = index.duplicate_id() {
            let err = SourceError::Invalid {
                path: path.clone(),
                reason: format!("duplicate category id '{}'", duplicate),
            };
            return Err(LoadError::IndexUnavailable(err.to_string()));
        }

        info!(
            path = %path,
            categories = index.categories.len(),
            preload = index.preload_ids().len(),
            "Index loaded"
        );
        Ok(index)
    }

    /// Fetch the legacy single-file dataset.
    pub async fn load_legacy(&self) -> Result<Catalog, SourceError> {
        let path = self.paths.legacy_path();
        let mut catalog: Catalog = self.fetch_document(&path).await?;
        catalog.normalize_ids();
        info!(
            path = %path,
            categories = catalog.categories.len(),
            "Legacy dataset loaded"
        );
        Ok(catalog)
    }

    async fn fetch_document<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        debug!(path, "Fetching document");
        let body = self.transport.fetch(path).await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
