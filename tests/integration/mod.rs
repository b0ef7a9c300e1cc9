//! Integration tests for linknav sessions

mod cache_persistence;
mod cli_contracts;
mod loader_concurrency;
mod scenarios;
mod support;
