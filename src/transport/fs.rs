use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Serves resources from a local site root directory.
pub struct FsTransport {
    root: PathBuf,
}

impl FsTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a site-relative path under the root. Paths escaping the root
    /// are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, TransportError> {
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(TransportError::Request {
                        path: path.to_string(),
                        reason: "path escapes the site root".to_string(),
                    });
                }
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Transport for FsTransport {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransportError::NotFound(path.to_string())
            } else {
                TransportError::Io {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }
}
