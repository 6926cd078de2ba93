//! Error taxonomy for the pipeline.
//!
//! `Read`, `ChunkRead` and `Transform` are per-file: the file worker records them and drops
//! the file. `Write` is fatal and propagates out of the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Stage;

/// Failure raised by a [`Transform`](crate::transform::Transform) for a single record.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("field `{field}` has unsupported value type {found}")]
    InvalidField { field: &'static str, found: &'static str },

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// File could not be opened or is not the expected container.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stream ended abnormally after the header was decoded.
    #[error("stream of {} broke: {message}", path.display())]
    ChunkRead { path: PathBuf, message: String },

    /// A record in a chunk could not be transformed.
    #[error("transform failed for {}: {source}", path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    /// Output I/O failure. Fatal for the whole run.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Stage to record in the ledger; `None` for write errors, which are never recorded.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Read { .. } => Some(Stage::Read),
            PipelineError::ChunkRead { .. } => Some(Stage::ChunkRead),
            PipelineError::Transform { .. } => Some(Stage::Transform),
            PipelineError::Write { .. } => None,
        }
    }

    /// Short reason without the path prefix, as stored in an [`ErrorEntry`](crate::ErrorEntry).
    pub fn reason(&self) -> String {
        match self {
            PipelineError::Read { source, .. } | PipelineError::Write { source, .. } => {
                source.to_string()
            }
            PipelineError::ChunkRead { message, .. } => message.clone(),
            PipelineError::Transform { source, .. } => source.to_string(),
        }
    }

    pub(crate) fn read(path: &std::path::Path, source: io::Error) -> Self {
        PipelineError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &std::path::Path, source: io::Error) -> Self {
        PipelineError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
