use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::PipelineError;
use crate::{ErrorEntry, Stage};

/// Append-only record of per-file failures, shared by all workers.
/// Read once at the end of the run; never consulted to steer control flow.
#[derive(Clone, Default)]
pub struct ErrorLedger {
    entries: Arc<Mutex<Vec<ErrorEntry>>>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry for `err`. Write errors carry no stage and are not recorded.
    pub fn record(&self, source: &Path, err: &PipelineError) {
        if let Some(stage) = err.stage() {
            self.push(source.to_path_buf(), stage, err.reason());
        }
    }

    pub fn push(&self, source: PathBuf, stage: Stage, message: String) {
        self.entries.lock().unwrap().push(ErrorEntry {
            source,
            stage,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().unwrap().clone()
    }
}

/// Log every ledger entry after the run. Prints nothing when the run was clean.
pub fn report_errors(entries: &[ErrorEntry]) {
    if entries.is_empty() {
        return;
    }
    log::warn!(
        "Errors occurred while processing {} file(s):",
        entries.len()
    );
    for entry in entries {
        log::warn!("  {}", entry);
    }
}
