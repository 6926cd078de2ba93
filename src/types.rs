//! Public and internal types for the rechunk API and pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::utils::config::Defaults;

/// One transformable unit of input/output data. Key order is preserved at every depth.
pub type Record = serde_json::Value;

/// Fixed-size slice of one file's record stream; the parallel-transform unit.
pub type Chunk = Vec<Record>;

/// Pipeline stage at which a file failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Read,
    ChunkRead,
    Transform,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::ChunkRead => "chunk-read",
            Stage::Transform => "transform",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-file failure recorded in the [`ErrorLedger`](crate::pipeline::ErrorLedger).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorEntry {
    pub source: PathBuf,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} error: {}",
            self.source.display(),
            self.stage,
            self.message
        )
    }
}

/// Order in which completed files are handed to the batch writer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// Sorted discovery order, regardless of which worker finishes first. Deterministic.
    #[default]
    Discovery,
    /// Whichever file finishes first is written first. Never holds finished results back.
    Completion,
}

/// Summary of one run, returned by [`rechunk_dir`](crate::rechunk_dir).
#[derive(Debug, Default)]
pub struct RunReport {
    pub files_discovered: usize,
    pub files_succeeded: usize,
    pub records_written: usize,
    /// Output files in index order.
    pub batches: Vec<PathBuf>,
    pub errors: Vec<ErrorEntry>,
}

impl RunReport {
    pub fn files_failed(&self) -> usize {
        self.errors.len()
    }
}

/// Lib-only options for [`rechunk_dir`](crate::rechunk_dir). Directories are passed separately.
#[derive(Clone, Debug)]
pub struct RechunkOpts {
    /// Records pulled from a file per parallel transform.
    pub chunk_size: usize,
    /// Records per output file.
    pub batch_size: usize,
    /// Files processed at the same time.
    pub max_concurrent_files: usize,
    /// Threads used to transform one chunk. When None, the rayon global pool is used.
    pub chunk_parallelism: Option<usize>,
    /// Output file name prefix (`<prefix>_000.json`).
    pub prefix: String,
    /// Glob on input file names (supports `*` and `?`).
    pub pattern: String,
    /// Field holding the record array in an object-shaped export.
    pub records_field: String,
    /// Field holding the context hint used for transform selection.
    pub hint_field: String,
    pub order: OutputOrder,
}

impl Default for RechunkOpts {
    fn default() -> Self {
        Self {
            chunk_size: Defaults::CHUNK_SIZE,
            batch_size: Defaults::BATCH_SIZE,
            max_concurrent_files: Defaults::MAX_CONCURRENT_FILES,
            chunk_parallelism: None,
            prefix: Defaults::PREFIX.to_string(),
            pattern: Defaults::PATTERN.to_string(),
            records_field: Defaults::RECORDS_FIELD.to_string(),
            hint_field: Defaults::HINT_FIELD.to_string(),
            order: OutputOrder::default(),
        }
    }
}

impl From<&Opts> for RechunkOpts {
    fn from(o: &Opts) -> Self {
        RechunkOpts {
            chunk_size: o.chunk_size,
            batch_size: o.batch_size,
            max_concurrent_files: o.max_concurrent_files,
            chunk_parallelism: o.chunk_parallelism,
            prefix: o.prefix.clone(),
            pattern: o.pattern.clone(),
            records_field: o.records_field.clone(),
            hint_field: o.hint_field.clone(),
            order: o.order,
        }
    }
}

/// Full options (CLI). Use [`RechunkOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: usize,
    pub batch_size: usize,
    pub max_concurrent_files: usize,
    pub chunk_parallelism: Option<usize>,
    pub prefix: String,
    pub pattern: String,
    pub records_field: String,
    pub hint_field: String,
    pub order: OutputOrder,
    /// Debug logging and a progress bar over files.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        let lib = RechunkOpts::default();
        Self {
            input_dir: PathBuf::from(Defaults::INPUT_DIR),
            output_dir: PathBuf::from(Defaults::OUTPUT_DIR),
            chunk_size: lib.chunk_size,
            batch_size: lib.batch_size,
            max_concurrent_files: lib.max_concurrent_files,
            chunk_parallelism: lib.chunk_parallelism,
            prefix: lib.prefix,
            pattern: lib.pattern,
            records_field: lib.records_field,
            hint_field: lib.hint_field,
            order: lib.order,
            verbose: false,
        }
    }
}
