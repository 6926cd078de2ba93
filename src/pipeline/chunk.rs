//! Chunking a record stream and transforming each chunk in parallel.

use std::path::Path;

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::PipelineError;
use crate::transform::Transform;
use crate::{Chunk, Record};

/// Pull up to `chunk_size` records. An empty chunk means the stream is exhausted.
///
/// A stream error mid-chunk fails the chunk; records already pulled are dropped with it.
pub fn next_chunk<I>(stream: &mut I, chunk_size: usize) -> Result<Chunk, PipelineError>
where
    I: Iterator<Item = Result<Record, PipelineError>>,
{
    let mut chunk = Vec::with_capacity(chunk_size);
    for item in stream.by_ref().take(chunk_size) {
        chunk.push(item?);
    }
    Ok(chunk)
}

/// Splits a stream into chunks and transforms each one, optionally on a dedicated pool.
pub struct ChunkProcessor<'p> {
    chunk_size: usize,
    pool: Option<&'p ThreadPool>,
}

impl<'p> ChunkProcessor<'p> {
    /// `pool: None` runs chunk transforms on the rayon global pool.
    pub fn new(chunk_size: usize, pool: Option<&'p ThreadPool>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            pool,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn next_chunk<I>(&self, stream: &mut I) -> Result<Chunk, PipelineError>
    where
        I: Iterator<Item = Result<Record, PipelineError>>,
    {
        next_chunk(stream, self.chunk_size)
    }

    /// Transform every record of `chunk`, keeping order. One failing record fails the chunk.
    pub fn transform_chunk(
        &self,
        chunk: &[Record],
        transform: &dyn Transform,
        source: &Path,
    ) -> Result<Chunk, PipelineError> {
        let run = || {
            chunk
                .par_iter()
                .map(|record| transform.transform(record))
                .collect::<Result<Vec<_>, _>>()
        };
        let transformed = match self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        transformed.map_err(|source_err| PipelineError::Transform {
            path: source.to_path_buf(),
            source: source_err,
        })
    }
}

/// Build the dedicated chunk pool when a parallelism degree is configured.
pub fn build_chunk_pool(parallelism: Option<usize>) -> anyhow::Result<Option<ThreadPool>> {
    parallelism
        .map(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n.max(1))
                .thread_name(|i| format!("chunk-worker-{i}"))
                .build()
                .map_err(|e| anyhow::anyhow!("build chunk pool: {e}"))
        })
        .transpose()
}
