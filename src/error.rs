//! Engine error taxonomy.
//!
//! The engine distinguishes caller mistakes (validation) from deployment
//! problems (configuration) and store failures, so the surrounding handler
//! can map each to the right signal. Collaborators outside the engine keep
//! using `anyhow` at their edges.

use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A required request parameter is missing or malformed. The message
    /// names the parameter so the caller can fix the request.
    #[error("missing required parameter: {0}")]
    Validation(&'static str),

    /// A required external resource identifier is absent from the
    /// environment. Fatal for the request.
    #[error("missing configuration: {0}")]
    Configuration(&'static str),

    /// The paginated fetch failed at some page. Pages already fetched are
    /// discarded; the engine never retries.
    #[error("store query failed: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::Configuration(_) => "configuration",
            EngineError::Store(_) => "store",
        }
    }

    /// `true` for errors the caller caused and can correct.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Structured failure reported to the caller in place of a result.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}
