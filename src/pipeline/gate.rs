//! Counting admission control for file workers.

use crossbeam_channel::{Receiver, Sender, bounded};

/// Bounds how many file workers run at once.
///
/// Slots are tokens in a bounded channel: acquiring takes one out (blocking while none are
/// left), dropping the [`GatePermit`] puts it back. Acquisition never fails or times out.
pub struct ConcurrencyGate {
    capacity: usize,
    slots_tx: Sender<()>,
    slots_rx: Receiver<()>,
}

impl ConcurrencyGate {
    /// Gate with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (slots_tx, slots_rx) = bounded(capacity);
        for _ in 0..capacity {
            let _ = slots_tx.send(());
        }
        Self {
            capacity,
            slots_tx,
            slots_rx,
        }
    }

    /// Block until a slot is free.
    pub fn acquire(&self) -> GatePermit<'_> {
        // The gate owns a sender, so the channel cannot disconnect while `self` is alive.
        let _ = self.slots_rx.recv();
        GatePermit { gate: self }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held by permits.
    pub fn in_use(&self) -> usize {
        self.capacity - self.slots_rx.len()
    }
}

/// A held slot. Released on drop, whatever the worker's outcome.
pub struct GatePermit<'g> {
    gate: &'g ConcurrencyGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        let _ = self.gate.slots_tx.send(());
    }
}
