//! Core domain types for the README table of contents.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// FolderLink
// ---------------------------------------------------------------------------

/// A link entry pointing at one top-level project folder.
///
/// Identity is the directory name, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLink {
    /// Directory name, i.e. the path segment between `./` and `/`.
    pub dir_name: String,
}

impl FolderLink {
    pub fn new(dir_name: impl Into<String>) -> Self {
        Self {
            dir_name: dir_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReadmeSection
// ---------------------------------------------------------------------------

/// A heading plus body block copied from a folder's own `README.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeSection {
    /// Heading text (the folder name), without the `###` prefix.
    pub heading: String,
    /// Trimmed body text.
    pub body: String,
}

impl ReadmeSection {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Folder
// ---------------------------------------------------------------------------

/// A subdirectory discovered under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Directory name (single path segment).
    pub name: String,
    /// Trimmed contents of `<folder>/README.md`, if the file exists.
    pub readme: Option<String>,
}

// ---------------------------------------------------------------------------
// RegenerateReport
// ---------------------------------------------------------------------------

/// Summary of one regenerate or check run.
#[derive(Debug, Clone, Serialize)]
pub struct RegenerateReport {
    /// README that was (or would be) rewritten.
    pub readme_path: PathBuf,
    /// Folders that received a new link, in output order.
    pub links_added: Vec<String>,
    /// Folders that received a new section.
    pub sections_added: Vec<String>,
    /// Folders whose existing section body was replaced.
    pub sections_refreshed: Vec<String>,
    /// Entries dropped because their folder no longer exists.
    pub pruned: Vec<String>,
    /// Non-blank lines in the managed region that matched no known block.
    pub unrecognized_lines: usize,
    /// Whether the regenerated text differs from what was on disk.
    pub changed: bool,
    /// Whether the README was written during this run.
    pub written: bool,
    pub finished_at: DateTime<Utc>,
}

impl RegenerateReport {
    pub fn new(readme_path: impl Into<PathBuf>) -> Self {
        Self {
            readme_path: readme_path.into(),
            links_added: Vec::new(),
            sections_added: Vec::new(),
            sections_refreshed: Vec::new(),
            pruned: Vec::new(),
            unrecognized_lines: 0,
            changed: false,
            written: false,
            finished_at: Utc::now(),
        }
    }
}
