//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            _ => {
                // macOS resource fork files start with ._
                name.starts_with("._")
            }
        }
    } else {
        false
    }
}

/// Returns true if `path` is an input candidate: its file name matches `pattern` and it is not
/// an OS metadata file.
pub fn should_include_input(path: &Path, pattern: &str) -> bool {
    if is_os_hidden_file(path) {
        return false;
    }
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => glob_match(pattern, name),
        None => false,
    }
}

/// Simple glob pattern matching (supports * and ?). A leading `.` in `text` is only matched by a
/// literal leading `.` in `pattern`, so `*.json` skips dotfiles.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if text.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }
    match_from(pattern, text)
}

fn match_from(pattern: &str, text: &str) -> bool {
    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                // Try to match rest of pattern at every remaining offset (including empty rest)
                let rest: String = pattern_chars.clone().collect();
                loop {
                    if match_from(&rest, &text_chars.clone().collect::<String>()) {
                        return true;
                    }
                    if text_chars.next().is_none() {
                        return false;
                    }
                }
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}

/// Canonicalize the input directory and make sure it is a directory.
pub fn check_input_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("input directory {}", path.display()))?;
    if !canonical.is_dir() {
        anyhow::bail!("input path is not a directory: {}", canonical.display());
    }
    Ok(canonical)
}

/// Create the output directory (and parents) if missing. Failure is fatal for the run.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("create output directory {}", path.display()))
}

/// `<prefix>_<NNN>.json` for output batch `index`.
pub fn batch_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:03}.json")
}
