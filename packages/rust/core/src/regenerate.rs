//! `regenerate` / `check`: read the README, merge in the folder list, and
//! write the result back.
//!
//! Every read and every validation happens before the single write, so a
//! failure never leaves a half-written README behind.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, instrument};

use foldertoc_markdown::{Markers, ReadmeDocument};
use foldertoc_shared::{AggregateConfig, FolderTocError, RegenerateReport, Result};

use crate::merge::merge_blocks;
use crate::scan::scan_folders;

/// Regenerated README text alongside what is on disk now.
struct Plan {
    current: String,
    next: String,
    report: RegenerateReport,
}

/// Rebuild the managed region of `readme` from the folders under `root` and
/// write the result back.
///
/// Nothing is written when the marker is missing, when any read fails, or
/// when the regenerated text is identical to the current one.
#[instrument(skip_all, fields(root = %root.display(), readme = %readme.display()))]
pub fn regenerate(root: &Path, readme: &Path, config: &AggregateConfig) -> Result<RegenerateReport> {
    let Plan {
        current,
        next,
        mut report,
    } = plan(root, readme, config)?;

    if current == next {
        debug!("README already up to date");
    } else {
        write_atomic(readme, &next)?;
        report.written = true;
    }
    report.finished_at = Utc::now();

    info!(
        links_added = report.links_added.len(),
        sections_added = report.sections_added.len(),
        sections_refreshed = report.sections_refreshed.len(),
        pruned = report.pruned.len(),
        written = report.written,
        "README regenerated"
    );
    Ok(report)
}

/// Compute what `regenerate` would produce without writing anything.
/// `report.changed` tells whether the README is stale.
#[instrument(skip_all, fields(root = %root.display(), readme = %readme.display()))]
pub fn check(root: &Path, readme: &Path, config: &AggregateConfig) -> Result<RegenerateReport> {
    let Plan { mut report, .. } = plan(root, readme, config)?;
    report.finished_at = Utc::now();
    info!(stale = report.changed, "README checked");
    Ok(report)
}

fn plan(root: &Path, readme: &Path, config: &AggregateConfig) -> Result<Plan> {
    config.validate()?;

    let current =
        std::fs::read_to_string(readme).map_err(|e| FolderTocError::io(readme, e))?;

    let markers = Markers {
        start: &config.marker,
        end: config.end_marker.as_deref(),
    };
    let mut doc = ReadmeDocument::parse(&current, markers)
        .ok_or_else(|| FolderTocError::missing_marker(readme, config.marker.as_str()))?;

    let folders = scan_folders(root, config)?;
    debug!(folders = folders.len(), "scanned project root");

    let mut report = RegenerateReport::new(readme);
    doc.blocks = merge_blocks(std::mem::take(&mut doc.blocks), &folders, config, &mut report);

    let next = doc.render();
    report.changed = next != current;

    Ok(Plan {
        current,
        next,
        report,
    })
}

/// Write to a sibling temp file, then rename over the target. The target's
/// permissions carry over to the new file.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FolderTocError::config(format!("{} is not a file path", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| FolderTocError::io(&temp, e))?;
    if let Ok(meta) = std::fs::metadata(path) {
        if let Err(e) = std::fs::set_permissions(&temp, meta.permissions()) {
            let _ = std::fs::remove_file(&temp);
            return Err(FolderTocError::io(&temp, e));
        }
    }
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(FolderTocError::io(path, e));
    }

    debug!(path = %path.display(), bytes = content.len(), "wrote README");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
