//! Pipeline components: discovery, record streams, chunking, workers, gate, sink, error ledger.

pub mod chunk;
pub mod context;
pub mod discover;
pub mod error_handler;
pub mod gate;
pub mod orchestrator;
pub mod sink;
pub mod stream;
pub mod worker;

pub use chunk::{ChunkProcessor, build_chunk_pool, next_chunk};
pub use context::{PipelineContext, setup_pipeline, validate_opts};
pub use discover::discover_inputs;
pub use error_handler::{ErrorLedger, report_errors};
pub use gate::{ConcurrencyGate, GatePermit};
pub use orchestrator::run_pipeline;
pub use sink::ResultSink;
pub use stream::{RecordStream, StreamOpts};
pub use worker::{FileOutcome, FileTask, FileWorker, WorkerEnv, WorkerState};
