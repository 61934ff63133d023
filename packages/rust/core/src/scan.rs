//! Top-level folder discovery.
//!
//! Lists the immediate subdirectories of the project root and loads each
//! one's own README, if present.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, instrument, warn};

use foldertoc_markdown::{has_marker_line, is_renderable_name};
use foldertoc_shared::{AggregateConfig, Folder, FolderTocError, Result};

/// Enumerate the folders to list in the table of contents.
///
/// Skips hidden folders (unless enabled), excluded names, names that are not
/// UTF-8 and names that cannot be rendered as a link. Names are compared
/// case-sensitively. With `sort` enabled the result is ordered by name;
/// otherwise the filesystem's iteration order is kept.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan_folders(root: &Path, config: &AggregateConfig) -> Result<Vec<Folder>> {
    let entries = std::fs::read_dir(root).map_err(|e| FolderTocError::io(root, e))?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FolderTocError::io(root, e))?;
        let path = entry.path();

        // Follows symlinks, so a linked folder counts as a folder.
        let is_dir = match std::fs::metadata(&path) {
            Ok(meta) => meta.is_dir(),
            // Dangling symlink.
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(FolderTocError::io(&path, e)),
        };
        if !is_dir {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "skipping folder with non-UTF-8 name");
            continue;
        };

        if !config.include_hidden && name.starts_with('.') {
            debug!(%name, "skipping hidden folder");
            continue;
        }
        if config.exclude.iter().any(|x| x == &name) {
            debug!(%name, "skipping excluded folder");
            continue;
        }
        if !is_renderable_name(&name) {
            warn!(%name, "skipping folder whose name cannot be rendered as a link");
            continue;
        }

        let mut readme = read_folder_readme(&path.join(&config.readme_file_name))?;
        if let Some(end) = config.end_marker.as_deref() {
            if readme.as_deref().is_some_and(|text| has_marker_line(text, end)) {
                warn!(%name, end_marker = end, "folder README contains the end marker; listing link only");
                readme = None;
            }
        }
        debug!(%name, has_readme = readme.is_some(), "found folder");
        folders.push(Folder { name, readme });
    }

    if config.sort {
        folders.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(folders)
}

/// Read and trim a folder README. A missing file (or a non-file at that
/// path) is `None`; any other failure is an error.
fn read_folder_readme(path: &Path) -> Result<Option<String>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FolderTocError::io(path, e)),
    }
    let content = std::fs::read_to_string(path).map_err(|e| FolderTocError::io(path, e))?;
    Ok(Some(content.replace("\r\n", "\n").trim().to_string()))
}
