//! Resource Transport
//!
//! Fetches raw resource bodies by site-relative path. Parsing is left to the
//! loaders so a malformed body is classified by the layer that expects it.

mod fs;
mod http;
mod memory;

pub use fs::FsTransport;
pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::error::TransportError;
use async_trait::async_trait;

/// Source of fetchable resources (index, fragments, legacy dataset).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `path`. Non-success responses are errors.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, TransportError>;
}

/// Join relative path segments with a single `/`, skipping empty segments.
pub fn join_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if base.is_empty() {
        relative.to_string()
    } else if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("data", "index.json"), "data/index.json");
        assert_eq!(join_path("data/", "/tools.json"), "data/tools.json");
        assert_eq!(join_path("", "data.json"), "data.json");
        assert_eq!(join_path("data", ""), "data");
    }
}
