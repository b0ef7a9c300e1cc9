//! Platform directory resolution.

mod xdg_root;

pub use xdg_root::{cache_home, fragment_cache_dir, state_dir};
