//! Per-file worker: open → select transform → stream chunks → succeeded | failed.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::chunk::ChunkProcessor;
use super::error_handler::ErrorLedger;
use super::stream::{RecordStream, StreamOpts};
use crate::Record;
use crate::error::{PipelineError, TransformError};
use crate::transform::{Transform, TransformSelector};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Opening,
    Selecting,
    Streaming,
    Succeeded,
    Failed,
}

/// Per-file unit of work. Mutated only by its own [`FileWorker`].
pub struct FileTask {
    /// Position in sorted discovery order.
    pub index: usize,
    pub path: PathBuf,
    pub results: Vec<Record>,
    pub failed: bool,
}

impl FileTask {
    pub fn new(index: usize, path: PathBuf) -> Self {
        Self {
            index,
            path,
            results: Vec::new(),
            failed: false,
        }
    }
}

impl fmt::Debug for FileTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileTask")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("results", &self.results.len())
            .field("failed", &self.failed)
            .finish()
    }
}

/// Terminal result of one file, sent to the result sink exactly once.
#[derive(Debug)]
pub enum FileOutcome {
    Succeeded {
        index: usize,
        path: PathBuf,
        records: Vec<Record>,
    },
    Failed {
        index: usize,
        path: PathBuf,
    },
}

impl FileOutcome {
    pub fn index(&self) -> usize {
        match self {
            FileOutcome::Succeeded { index, .. } | FileOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Succeeded { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Succeeded { .. })
    }
}

/// Shared, read-only collaborators of every worker in a run.
pub struct WorkerEnv<'a> {
    pub selector: &'a TransformSelector,
    pub stream_opts: &'a StreamOpts,
    pub processor: &'a ChunkProcessor<'a>,
    pub ledger: &'a ErrorLedger,
}

pub struct FileWorker<'e> {
    task: FileTask,
    state: WorkerState,
    env: &'e WorkerEnv<'e>,
}

impl<'e> FileWorker<'e> {
    pub fn new(index: usize, path: PathBuf, env: &'e WorkerEnv<'e>) -> Self {
        Self {
            task: FileTask::new(index, path),
            state: WorkerState::Opening,
            env,
        }
    }

    /// Drive the file to a terminal state. Failures are recorded in the ledger and never escape;
    /// a panicking transform fails the file like any other transform error.
    pub fn run(mut self) -> FileOutcome {
        info!(
            "Processing file: {}",
            self.task
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default()
        );
        let driven = panic::catch_unwind(AssertUnwindSafe(|| self.drive()))
            .unwrap_or_else(|payload| {
                Err(PipelineError::Transform {
                    path: self.task.path.clone(),
                    source: TransformError::Custom(format!(
                        "transform panicked: {}",
                        panic_message(payload.as_ref())
                    )),
                })
            });
        match driven {
            Ok(()) => {
                self.transition(WorkerState::Succeeded);
                debug!(
                    "{}: {} records transformed",
                    self.task.path.display(),
                    self.task.results.len()
                );
                FileOutcome::Succeeded {
                    index: self.task.index,
                    path: self.task.path,
                    records: self.task.results,
                }
            }
            Err(err) => {
                self.task.failed = true;
                // No partial output from a failed file.
                self.task.results = Vec::new();
                self.env.ledger.record(&self.task.path, &err);
                warn!("{}", err);
                self.transition(WorkerState::Failed);
                FileOutcome::Failed {
                    index: self.task.index,
                    path: self.task.path,
                }
            }
        }
    }

    fn drive(&mut self) -> Result<(), PipelineError> {
        let mut stream = RecordStream::open(&self.task.path, self.env.stream_opts)?;

        self.transition(WorkerState::Selecting);
        let transform = self.env.selector.select(stream.hint());
        debug!(
            "{}: using {} transform",
            self.task.path.display(),
            transform.name()
        );

        self.transition(WorkerState::Streaming);
        let processor = self.env.processor;
        loop {
            let chunk = processor.next_chunk(&mut stream)?;
            if chunk.is_empty() {
                break;
            }
            let transformed =
                processor.transform_chunk(&chunk, transform.as_ref(), &self.task.path)?;
            self.task.results.extend(transformed);
        }
        Ok(())
    }

    fn transition(&mut self, next: WorkerState) {
        debug!(
            "{}: {:?} -> {:?}",
            self.task.path.display(),
            self.state,
            next
        );
        self.state = next;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
