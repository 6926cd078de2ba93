//! Record transforms and the hint-keyed table that picks one per file.

pub mod user;

use std::fmt;
use std::sync::Arc;

use crate::Record;
use crate::error::TransformError;

pub use user::UserTransform;

/// A stateless record mapping. Called from rayon workers, so it must be `Send + Sync`.
pub trait Transform: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Map one record to a new one. The source record is never modified.
    fn transform(&self, record: &Record) -> Result<Record, TransformError>;
}

/// Ordered `(key, transform)` table with a mandatory default.
///
/// [`select`](Self::select) scans the table in registration order and returns the first entry
/// whose key is a substring of the hint. Empty keys never match.
#[derive(Clone)]
pub struct TransformSelector {
    table: Vec<(String, Arc<dyn Transform>)>,
    default: Arc<dyn Transform>,
}

impl TransformSelector {
    /// Empty table; every hint resolves to `default`.
    pub fn new(default: Arc<dyn Transform>) -> Self {
        Self {
            table: Vec::new(),
            default,
        }
    }

    /// Append an entry. Entries registered earlier win ties.
    pub fn register(mut self, key: impl Into<String>, transform: Arc<dyn Transform>) -> Self {
        self.table.push((key.into(), transform));
        self
    }

    pub fn select(&self, hint: Option<&str>) -> Arc<dyn Transform> {
        let Some(hint) = hint.filter(|h| !h.is_empty()) else {
            return Arc::clone(&self.default);
        };
        self.table
            .iter()
            .find(|(key, _)| !key.is_empty() && hint.contains(key.as_str()))
            .map(|(_, t)| Arc::clone(t))
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    pub fn default_transform(&self) -> &Arc<dyn Transform> {
        &self.default
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for TransformSelector {
    /// `users` → [`UserTransform`], falling back to [`UserTransform`].
    fn default() -> Self {
        let user: Arc<dyn Transform> = Arc::new(UserTransform);
        TransformSelector::new(Arc::clone(&user)).register("users", user)
    }
}

impl fmt::Debug for TransformSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSelector")
            .field(
                "table",
                &self
                    .table
                    .iter()
                    .map(|(k, t)| (k.as_str(), t.name()))
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.default.name())
            .finish()
    }
}
