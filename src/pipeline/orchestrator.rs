use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info};
use std::path::PathBuf;
use std::thread::{self, Scope};

use super::chunk::{ChunkProcessor, build_chunk_pool};
use super::context::PipelineContext;
use super::error_handler::ErrorLedger;
use super::gate::ConcurrencyGate;
use super::sink::ResultSink;
use super::worker::{FileOutcome, FileWorker, WorkerEnv};
use crate::RunReport;
use crate::engine::progress::{ProgressBar, update_progress_bar};
use crate::error::PipelineError;
use crate::transform::TransformSelector;
use crate::writer::{BatchSummary, BatchWriter};

/// Run every discovered file through a worker and write the combined result in batches.
///
/// Dispatcher thread → (gate) → one scoped worker thread per file → outcome channel → sink →
/// batch writer on the calling thread. Per-file failures end up in the report; a write failure
/// is returned as the run's error once every launched worker has finished.
pub fn run_pipeline(
    ctx: &PipelineContext,
    selector: &TransformSelector,
    progress: Option<&ProgressBar>,
) -> Result<RunReport> {
    info!(
        "Processing {} JSON files from {}",
        ctx.files.len(),
        ctx.input_dir.display()
    );
    debug!("transform table: {:?}", selector);

    let pool = build_chunk_pool(ctx.opts.chunk_parallelism)?;
    let processor = ChunkProcessor::new(ctx.opts.chunk_size, pool.as_ref());
    let ledger = ErrorLedger::new();
    let env = WorkerEnv {
        selector,
        stream_opts: &ctx.stream_opts,
        processor: &processor,
        ledger: &ledger,
    };
    let gate = ConcurrencyGate::new(ctx.opts.max_concurrent_files);
    let writer = BatchWriter::new(&ctx.output_dir, &ctx.opts.prefix, ctx.opts.batch_size);
    let sink = ResultSink::new(ctx.opts.order);
    let (outcome_tx, outcome_rx) = unbounded::<FileOutcome>();

    // The scope joins every worker before returning, also when the writer failed.
    let drained = thread::scope(|s| {
        let env = &env;
        let gate = &gate;
        let files = &ctx.files;
        s.spawn(move || dispatch_workers(s, files, gate, env, outcome_tx));
        drain_outcomes(outcome_rx, sink, writer, progress)
    });
    let (summary, files_succeeded) = drained?;

    Ok(RunReport {
        files_discovered: ctx.files.len(),
        files_succeeded,
        records_written: summary.records_written,
        batches: summary.batches,
        errors: ledger.entries(),
    })
}

/// Launch one worker per file, in discovery order, each only once it holds a gate slot.
fn dispatch_workers<'scope, 'env>(
    s: &'scope Scope<'scope, 'env>,
    files: &'env [PathBuf],
    gate: &'env ConcurrencyGate,
    env: &'env WorkerEnv<'env>,
    outcome_tx: Sender<FileOutcome>,
) {
    for (index, path) in files.iter().enumerate() {
        let permit = gate.acquire();
        let tx = outcome_tx.clone();
        s.spawn(move || {
            let outcome = FileWorker::new(index, path.clone(), env).run();
            drop(permit);
            // The receiver is gone only after a fatal write error; the outcome is moot then.
            let _ = tx.send(outcome);
        });
    }
    drop(outcome_tx);
}

/// Feed outcomes through the sink into the writer until every worker has reported.
fn drain_outcomes(
    outcome_rx: Receiver<FileOutcome>,
    mut sink: ResultSink,
    mut writer: BatchWriter,
    progress: Option<&ProgressBar>,
) -> Result<(BatchSummary, usize), PipelineError> {
    for outcome in outcome_rx.iter() {
        debug!(
            "{} finished ({})",
            outcome.path().display(),
            if outcome.is_success() { "ok" } else { "failed" }
        );
        if let Some(bar) = progress {
            update_progress_bar(bar, 1);
        }
        for records in sink.accept(outcome) {
            writer.extend(records)?;
        }
    }
    let files_succeeded = sink.files_succeeded();
    Ok((writer.finish()?, files_succeeded))
}
