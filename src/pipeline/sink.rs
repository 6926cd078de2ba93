//! Orders completed file results before they reach the batch writer.

use std::collections::BTreeMap;

use super::worker::FileOutcome;
use crate::{OutputOrder, Record};

/// Receives every [`FileOutcome`] once and releases record lists in [`OutputOrder`].
///
/// In discovery order, a finished file waits in `pending` until every file discovered before it
/// has finished (failed files release their slot with no records).
pub struct ResultSink {
    order: OutputOrder,
    next_index: usize,
    pending: BTreeMap<usize, Option<Vec<Record>>>,
    files_succeeded: usize,
}

impl ResultSink {
    pub fn new(order: OutputOrder) -> Self {
        Self {
            order,
            next_index: 0,
            pending: BTreeMap::new(),
            files_succeeded: 0,
        }
    }

    /// Accept one outcome; returns the record lists that are now ready, in write order.
    pub fn accept(&mut self, outcome: FileOutcome) -> Vec<Vec<Record>> {
        let (index, records) = match outcome {
            FileOutcome::Succeeded { index, records, .. } => {
                self.files_succeeded += 1;
                (index, Some(records))
            }
            FileOutcome::Failed { index, .. } => (index, None),
        };
        match self.order {
            OutputOrder::Completion => records.into_iter().collect(),
            OutputOrder::Discovery => {
                self.pending.insert(index, records);
                let mut ready = Vec::new();
                while let Some(slot) = self.pending.remove(&self.next_index) {
                    ready.extend(slot);
                    self.next_index += 1;
                }
                ready
            }
        }
    }

    pub fn files_succeeded(&self) -> usize {
        self.files_succeeded
    }

    /// Files finished but still held back behind an unfinished earlier file.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
