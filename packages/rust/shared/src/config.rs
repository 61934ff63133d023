//! Application configuration for foldertoc.
//!
//! Project config lives at `<root>/foldertoc.toml`, with a user-wide fallback
//! at `~/.foldertoc/foldertoc.toml`. CLI flags override config file values,
//! which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolderTocError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "foldertoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".foldertoc";

/// Marker used when the config does not name one.
pub const DEFAULT_MARKER: &str = "<!-- foldertoc -->";

// ---------------------------------------------------------------------------
// Config structs (matching foldertoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which README to manage and where its managed region sits.
    #[serde(default)]
    pub readme: ReadmeConfig,

    /// Directory scan policies.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Section merge policies.
    #[serde(default)]
    pub sections: SectionsConfig,
}

/// `[readme]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeConfig {
    /// README file name, both at the root and inside each folder.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Literal text that opens the managed region.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Optional literal text that closes the managed region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_marker: Option<String>,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            marker: default_marker(),
            end_marker: None,
        }
    }
}

fn default_file_name() -> String {
    "README.md".into()
}
fn default_marker() -> String {
    DEFAULT_MARKER.into()
}

/// `[scan]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Sort folders by name instead of using filesystem order.
    #[serde(default = "default_true")]
    pub sort: bool,

    /// Include folders whose name starts with a dot.
    #[serde(default)]
    pub include_hidden: bool,

    /// Folder names that are never listed.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Drop entries whose folder no longer exists.
    #[serde(default)]
    pub prune: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sort: true,
            include_hidden: false,
            exclude: default_exclude(),
            prune: false,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_exclude() -> Vec<String> {
    vec!["node_modules".into(), "target".into()]
}

/// How a folder whose README changed is reflected in the sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionUpdate {
    /// Replace the body of the existing section in place.
    #[default]
    Refresh,
    /// Keep the old section and append a new one with the current body.
    Append,
}

/// `[sections]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionsConfig {
    #[serde(default)]
    pub update: SectionUpdate,
}

// ---------------------------------------------------------------------------
// Aggregate config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime aggregation settings, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Nested README file name looked up in each folder.
    pub readme_file_name: String,
    /// Literal text opening the managed region.
    pub marker: String,
    /// Optional literal text closing the managed region.
    pub end_marker: Option<String>,
    pub sort: bool,
    pub include_hidden: bool,
    pub exclude: Vec<String>,
    pub prune: bool,
    pub section_update: SectionUpdate,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AggregateConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            readme_file_name: config.readme.file_name.clone(),
            marker: config.readme.marker.clone(),
            end_marker: config.readme.end_marker.clone(),
            sort: config.scan.sort,
            include_hidden: config.scan.include_hidden,
            exclude: config.scan.exclude.clone(),
            prune: config.scan.prune,
            section_update: config.sections.update,
        }
    }
}

impl AggregateConfig {
    /// Reject settings that would make the managed region ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.marker.is_empty() {
            return Err(FolderTocError::config("marker must not be empty"));
        }
        if self.readme_file_name.is_empty() {
            return Err(FolderTocError::config("readme file name must not be empty"));
        }
        match self.end_marker.as_deref() {
            Some("") => Err(FolderTocError::config("end_marker must not be empty")),
            Some(end) if end == self.marker => Err(FolderTocError::config(
                "end_marker must differ from marker",
            )),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.foldertoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FolderTocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Load config for a project root.
///
/// Looks for `<root>/foldertoc.toml`, then the user-wide file, and falls back
/// to defaults when neither exists.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let project = root.join(CONFIG_FILE_NAME);
    if project.is_file() {
        return load_config_from(&project);
    }

    if let Ok(dir) = config_dir() {
        let user = dir.join(CONFIG_FILE_NAME);
        if user.is_file() {
            return load_config_from(&user);
        }
    }

    tracing::debug!(root = %root.display(), "no config file found, using defaults");
    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FolderTocError::io(path, e))?;

    let config = toml::from_str(&content).map_err(|e| {
        FolderTocError::parse(format!("failed to parse {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Write a default `foldertoc.toml` into `root`.
/// Refuses to overwrite an existing file. Returns the path written.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(FolderTocError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| FolderTocError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FolderTocError::io(&path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path)
}
