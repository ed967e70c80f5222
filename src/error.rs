//! Error kinds surfaced by the retrieval engine.

use thiserror::Error;

/// Failures the engine reports to its callers.
///
/// A query yielding no keywords is not an error: it produces an empty
/// result. Scoring itself is total and cannot fail.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Ingested text too short to index. Surfaced as a rejected upload,
    /// not retried.
    #[error("no extractable content in \"{name}\": {length} chars after trimming, minimum {min}")]
    EmptyDocument {
        name: String,
        length: usize,
        min: usize,
    },

    /// The persistence layer could not be reached. Retry policy belongs
    /// to the caller.
    #[error("chunk store unavailable")]
    Store(#[source] anyhow::Error),
}
