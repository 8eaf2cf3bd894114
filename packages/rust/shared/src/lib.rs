//! Shared error model and configuration for bookdesk.
//!
//! This crate is the foundation depended on by all other bookdesk crates.
//! It provides:
//! - [`BookdeskError`] — the unified error type
//! - Configuration ([`AppConfig`], [`BookConfig`], config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BookConfig, CompletionConfig, ServerConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{BookdeskError, Result};
