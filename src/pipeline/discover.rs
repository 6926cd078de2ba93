//! Input discovery: one level of the input directory, filtered by file-name glob, sorted.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::engine::tools::{check_input_dir, should_include_input};

/// One result from listing the input directory: a candidate file or an error with optional path.
pub enum DiscoverOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`DiscoverOutcome`]. Directories are skipped by the caller.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<DiscoverOutcome> {
    match r {
        Ok(entry) if entry.file_type().is_file() => Some(DiscoverOutcome::Ok(entry.into_path())),
        Ok(_) => None,
        Err(err) => Some(DiscoverOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        }),
    }
}

/// Input files directly under `input_dir` whose name matches `pattern`, in sorted path order.
///
/// Entries that cannot be listed are logged and skipped; an unreadable input directory is an error.
pub fn discover_inputs(input_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let root = check_input_dir(input_dir)?;
    let mut files = Vec::new();
    let iter = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(to_outcome_walkdir);
    for outcome in iter {
        match outcome {
            DiscoverOutcome::Ok(path) => {
                if should_include_input(&path, pattern) {
                    files.push(path);
                }
            }
            DiscoverOutcome::Err { msg, path } => {
                let shown = path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<no-path>".to_string());
                log::warn!("skipped {}: {}", shown, msg);
            }
        }
    }
    files.sort();
    Ok(files)
}
