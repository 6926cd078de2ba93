//! Load `.rechunk.toml` from the input directory (CLI only). Lib callers pass [`RechunkOpts`](crate::RechunkOpts) directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{Opts, OutputOrder};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RechunkToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    output_dir: Option<String>,
    chunk_size: Option<usize>,
    batch_size: Option<usize>,
    max_concurrent_files: Option<usize>,
    chunk_parallelism: Option<usize>,
    prefix: Option<String>,
    pattern: Option<String>,
    records_field: Option<String>,
    hint_field: Option<String>,
    order: Option<OutputOrder>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir` if present. Ok(None) if there is no such file; a file that
/// exists but cannot be read or parsed is an error.
pub(crate) fn load_rechunk_toml(dir: &Path) -> Result<Option<RechunkToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let file = parse_rechunk_toml(&s)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    Ok(Some(file))
}

pub(crate) fn parse_rechunk_toml(s: &str) -> Result<RechunkToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
/// The input directory is never in the file; it is where the file was found.
pub(crate) fn apply_file_to_opts(file: &RechunkToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.output_dir {
        opts.output_dir = PathBuf::from(p);
    }
    apply_file_opt!(s, opts, chunk_size);
    apply_file_opt!(s, opts, batch_size);
    apply_file_opt!(s, opts, max_concurrent_files);
    if let Some(n) = s.chunk_parallelism {
        opts.chunk_parallelism = Some(n);
    }
    apply_file_opt!(s, opts, prefix);
    apply_file_opt!(s, opts, pattern);
    apply_file_opt!(s, opts, records_field);
    apply_file_opt!(s, opts, hint_field);
    apply_file_opt!(s, opts, order);
    apply_file_opt!(s, opts, verbose);
}
