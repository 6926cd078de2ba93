use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::utils::config::PackagePaths;

/// Temporary sibling for an output batch (`users_000.json.rechunk.tmp`).
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    final_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.{}", PackagePaths::get().temp_suffix()))
}

/// Move a finished temp file onto its final name. Same directory, so the rename is atomic.
pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<(), PipelineError> {
    fs::rename(temp_path, final_path).map_err(|e| PipelineError::write(final_path, e))
}

/// Best-effort removal of a temp file left behind by a failed write.
pub fn remove_stale_temp(temp_path: &Path) {
    if temp_path.exists() {
        let _ = fs::remove_file(temp_path);
    }
}
