//! Pluggable generation backend trait.
//!
//! The engine talks to the model through `DefinitionSource` so the
//! dispatch/retry logic can be tested against a scripted backend.
//! Current implementation: `OllamaClient`.

use crate::error::EnrichError;

/// A backend that turns one batch prompt into accumulated response text.
pub trait DefinitionSource {
    /// Send one user prompt (newline-joined word list) and return the
    /// full accumulated response text.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError` on transport failure; content problems are
    /// not errors and surface later as unparseable or missing records.
    fn generate(&self, user_prompt: &str) -> Result<String, EnrichError>;
}
