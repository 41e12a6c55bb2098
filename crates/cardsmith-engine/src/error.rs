//! Error types for the enrichment engine.
//!
//! Only transport-level problems are errors: a request that cannot be
//! sent, or a response stream that dies mid-read, aborts the run.
//! Content-level problems (malformed fragments, bad record lines,
//! omitted words) are absorbed and degrade to the missing-word path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// The generation endpoint could not be reached, timed out, or
    /// returned a non-success status.
    #[error("generation endpoint error: {0}")]
    Transport(#[from] ureq::Error),

    /// The response stream failed while being read.
    #[error("response stream error: {0}")]
    Stream(#[from] std::io::Error),
}
