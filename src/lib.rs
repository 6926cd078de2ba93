//! Rechunk: stream a directory of JSON exports, normalize every record and re-chunk the
//! combined stream into fixed-size output files.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod transform;
pub mod types;
pub mod utils;
pub mod writer;

/// Re-export types for API
pub use types::*;

pub use error::{PipelineError, TransformError};
pub use transform::{Transform, TransformSelector, UserTransform};

use log::debug;
use std::path::Path;

/// Result alias used by public rechunk API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: process every matching file in `input_dir` and write batches to `output_dir`.
///
/// Uses the default transform table (`users` → [`UserTransform`], falling back to it as well).
/// Per-file failures are returned in [`RunReport::errors`]; the call itself fails only when the
/// options are invalid, the input directory cannot be listed, or output cannot be written.
pub fn rechunk_dir(input_dir: &Path, output_dir: &Path, opts: &RechunkOpts) -> Result<RunReport> {
    rechunk_dir_with_selector(input_dir, output_dir, opts, &TransformSelector::default())
}

/// Same as [`rechunk_dir`] with a caller-supplied transform table.
pub fn rechunk_dir_with_selector(
    input_dir: &Path,
    output_dir: &Path,
    opts: &RechunkOpts,
    selector: &TransformSelector,
) -> Result<RunReport> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    let ctx = pipeline::setup_pipeline(input_dir, output_dir, opts)?;
    pipeline::run_pipeline(&ctx, selector, None)
}
