//! Shared types, error model, and configuration for foldertoc.
//!
//! This crate is the foundation depended on by all other foldertoc crates.
//! It provides:
//! - [`FolderTocError`], the unified error type
//! - Domain types ([`FolderLink`], [`ReadmeSection`], [`Folder`], [`RegenerateReport`])
//! - Configuration ([`AppConfig`], [`AggregateConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AggregateConfig, AppConfig, CONFIG_FILE_NAME, DEFAULT_MARKER, ReadmeConfig, ScanConfig,
    SectionUpdate, SectionsConfig, config_dir, init_config, load_config, load_config_from,
};
pub use error::{FolderTocError, Result};
pub use types::{Folder, FolderLink, ReadmeSection, RegenerateReport};
