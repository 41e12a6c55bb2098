//! cardsmith-engine: batched LLM definition enrichment.
//!
//! Takes a vocabulary word list, sends it to an Ollama-style streaming
//! chat endpoint in batches, reconciles the streamed NDJSON output
//! against the requested words, retries the unresolved subset at a
//! smaller batch size, and post-processes each definition into a
//! learner-facing form.

pub mod cleaner;
pub mod engine;
pub mod error;
pub mod ollama;
pub mod protocol;
pub mod source;

pub use cleaner::{clean, CleanerConfig};
pub use engine::{Definition, EngineConfig, EnrichEngine, EnrichOutcome};
pub use error::EnrichError;
pub use ollama::{OllamaClient, DEFAULT_CHAT_URL};
pub use source::DefinitionSource;
