//! Pipeline context: validated options, derived settings and the discovered input list.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::discover::discover_inputs;
use super::stream::StreamOpts;
use crate::RechunkOpts;
use crate::engine::tools::ensure_output_dir;

/// Everything a run needs before any worker starts. Built by [`setup_pipeline`].
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub opts: RechunkOpts,
    pub stream_opts: StreamOpts,
    /// Input files in sorted discovery order; a file's index here is its `FileTask` index.
    pub files: Vec<PathBuf>,
}

/// Reject option values the pipeline cannot run with.
pub fn validate_opts(opts: &RechunkOpts) -> Result<()> {
    if opts.chunk_size == 0 {
        anyhow::bail!("chunk_size must be at least 1");
    }
    if opts.batch_size == 0 {
        anyhow::bail!("batch_size must be at least 1");
    }
    if opts.max_concurrent_files == 0 {
        anyhow::bail!("max_concurrent_files must be at least 1");
    }
    if opts.chunk_parallelism == Some(0) {
        anyhow::bail!("chunk_parallelism must be at least 1 when set");
    }
    if opts.prefix.is_empty() {
        anyhow::bail!("output prefix must not be empty");
    }
    Ok(())
}

/// Validate options, discover inputs and create the output directory.
/// Output directory creation failure is fatal.
pub fn setup_pipeline(
    input_dir: &Path,
    output_dir: &Path,
    opts: &RechunkOpts,
) -> Result<PipelineContext> {
    validate_opts(opts)?;
    let files = discover_inputs(input_dir, &opts.pattern)?;
    ensure_output_dir(output_dir)?;
    Ok(PipelineContext {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        opts: opts.clone(),
        stream_opts: StreamOpts::from(opts),
        files,
    })
}
