use clap::Parser;
use std::path::PathBuf;

use crate::OutputOrder;
use crate::utils::config::Defaults;

/// Stream a directory of JSON exports, normalize each record and write fixed-size batches.
#[derive(Clone, Parser)]
#[command(name = "rechunk")]
#[command(about = "Re-chunk a directory of JSON exports into fixed-size, normalized batch files.")]
pub struct Cli {
    /// Directory holding the input exports.
    #[arg(value_name = "INPUT_DIR", default_value = Defaults::INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Directory for the numbered output files. Created if missing.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Records pulled from a file per parallel transform.
    #[arg(long, short = 'c', value_parser = clap::value_parser!(usize))]
    pub chunk_size: Option<usize>,

    /// Records per output file.
    #[arg(long, short = 'b', value_parser = clap::value_parser!(usize))]
    pub batch_size: Option<usize>,

    /// Input files processed at the same time.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub max_concurrent_files: Option<usize>,

    /// Threads transforming one chunk. Default: shared pool sized to the CPU count.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub chunk_parallelism: Option<usize>,

    /// Output file prefix (`<prefix>_000.json`).
    #[arg(long, short = 'p')]
    pub prefix: Option<String>,

    /// Glob on input file names.
    #[arg(long)]
    pub pattern: Option<String>,

    /// Field holding the record array in object-shaped exports.
    #[arg(long)]
    pub records_field: Option<String>,

    /// Field holding the context hint used to pick a transform.
    #[arg(long)]
    pub hint_field: Option<String>,

    /// Cross-file output order.
    #[arg(long, value_enum)]
    pub order: Option<OutputOrder>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
