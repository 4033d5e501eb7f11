//! Reporter error types.

use super::ollama::OllamaError;
use crate::mbta::FetchError;

/// Errors that stop a report run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// An MBTA call failed; `what` names the call.
    #[error("MBTA API error ({what}): {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Ollama(#[from] OllamaError),

    /// Prompt data could not be serialized
    #[error("failed to encode report data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to render report: {0}")]
    Template(#[from] askama::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
