//! Global batching writer: re-chunks the combined record stream into numbered output files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::Record;
use crate::engine::tools::batch_file_name;
use crate::error::PipelineError;
use crate::utils::config::WRITE_BUFFER_SIZE;
use crate::utils::{remove_stale_temp, rename_temp_to_final, temp_path_for};

/// What the writer produced.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub records_written: usize,
    /// Output files in index order.
    pub batches: Vec<PathBuf>,
}

/// Accumulates at most one batch of records and writes it as soon as it is full.
///
/// Batch numbering runs over the combined stream, independent of which file a record came from.
/// Every error is [`PipelineError::Write`] and is meant to abort the run.
pub struct BatchWriter {
    output_dir: PathBuf,
    prefix: String,
    batch_size: usize,
    batch: Vec<Record>,
    summary: BatchSummary,
}

impl BatchWriter {
    pub fn new(output_dir: &Path, prefix: &str, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            output_dir: output_dir.to_path_buf(),
            prefix: prefix.to_string(),
            batch_size,
            batch: Vec::with_capacity(batch_size),
            summary: BatchSummary::default(),
        }
    }

    pub fn push(&mut self, record: Record) -> Result<(), PipelineError> {
        self.batch.push(record);
        if self.batch.len() == self.batch_size {
            self.flush_batch()?;
        }
        Ok(())
    }

    pub fn extend<I>(&mut self, records: I) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.push(record)?;
        }
        Ok(())
    }

    /// Write the final short batch, if any, and return what was written.
    pub fn finish(mut self) -> Result<BatchSummary, PipelineError> {
        if !self.batch.is_empty() {
            self.flush_batch()?;
        }
        Ok(self.summary)
    }

    fn flush_batch(&mut self) -> Result<(), PipelineError> {
        let index = self.summary.batches.len();
        let path = self
            .output_dir
            .join(batch_file_name(&self.prefix, index));
        write_batch_file(&path, &self.batch)?;
        info!("Wrote {} records to {}", self.batch.len(), path.display());
        self.summary.records_written += self.batch.len();
        self.summary.batches.push(path);
        self.batch.clear();
        Ok(())
    }
}

/// Stream `records` into a temp sibling of `path`, then rename it into place.
pub fn write_batch_file(path: &Path, records: &[Record]) -> Result<(), PipelineError> {
    let temp = temp_path_for(path);
    let written = File::create(&temp).and_then(|file| {
        let mut w = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        write_json_array(&mut w, records)?;
        w.flush()
    });
    if let Err(e) = written {
        remove_stale_temp(&temp);
        return Err(PipelineError::write(path, e));
    }
    rename_temp_to_final(&temp, path).inspect_err(|_| remove_stale_temp(&temp))
}

/// `[\n`, pretty records (2-space indent) joined by `,\n`, then `\n]` with no trailing newline.
pub fn write_json_array<'r, W, I>(w: &mut W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'r Record>,
{
    w.write_all(b"[\n")?;
    for (i, record) in records.into_iter().enumerate() {
        if i > 0 {
            w.write_all(b",\n")?;
        }
        serde_json::to_writer_pretty(&mut *w, record)?;
    }
    w.write_all(b"\n]")
}
