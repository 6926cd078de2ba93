pub mod config;
pub mod logger;
pub(crate) mod rechunk_toml;
pub mod tempfiles;

pub use config::*;
pub use logger::{Colors, setup_logging};
pub(crate) use rechunk_toml::{apply_file_to_opts, load_rechunk_toml};
pub use tempfiles::{remove_stale_temp, rename_temp_to_final, temp_path_for};
