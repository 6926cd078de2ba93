//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    temp_suffix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                temp_suffix: format!("{pkg}.tmp"),
            }
        })
    }

    /// Per-directory settings file (`.rechunk.toml`), looked up in the input directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Suffix of in-progress batch files before they are renamed into place.
    pub fn temp_suffix(&self) -> &str {
        &self.temp_suffix
    }
}

// ---- Run defaults ----

/// Defaults shared by the CLI, the settings file and [`RechunkOpts`](crate::RechunkOpts).
pub struct Defaults;

impl Defaults {
    pub const INPUT_DIR: &'static str = "usersapi";
    pub const OUTPUT_DIR: &'static str = "transformed_users";
    pub const CHUNK_SIZE: usize = 100;
    pub const BATCH_SIZE: usize = 100;
    pub const MAX_CONCURRENT_FILES: usize = 2;
    pub const PREFIX: &'static str = "users";
    pub const PATTERN: &'static str = "*.json";
    /// OData exports keep their records under `value`.
    pub const RECORDS_FIELD: &'static str = "value";
    pub const HINT_FIELD: &'static str = "@odata.context";
}

// ---- Streaming ----

/// Decoded records buffered between a file's decoder thread and its worker.
pub const STREAM_CHANNEL_CAP: usize = 256;

/// Capacity of the `BufWriter` used for one output batch (bytes). 64 KB.
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Capacity of the `BufReader` over one input file (bytes). 64 KB.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;
