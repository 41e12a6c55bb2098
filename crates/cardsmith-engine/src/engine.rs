//! Batch dispatch plus reconciliation and retry.
//!
//! The word list is cut into fixed-size contiguous batches, each batch
//! becomes one generation request, and the decoded records are checked
//! off against the batch. Words the model skipped (or answered with an
//! empty or unparseable line) land in the missing set; after the full
//! initial pass the missing set is re-dispatched in smaller sub-batches
//! for a bounded number of rounds. Whatever survives every round is
//! finalized with empty definitions and reported.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use crate::cleaner::{self, CleanerConfig};
use crate::error::EnrichError;
use crate::protocol;
use crate::source::DefinitionSource;

// ─── Configuration ─────────────────────────────────────────────

/// Knobs for one enrichment run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Words per initial-pass request (minimum 1).
    pub batch_size: usize,
    /// Words per retry request (minimum 1, typically smaller).
    pub retry_batch_size: usize,
    /// Maximum retry rounds after the initial pass.
    pub max_retries: usize,
    /// Apply the cleaner to each resolved definition.
    pub apply_clean: bool,
    /// Cleaner behavior switches.
    pub cleaner: CleanerConfig,
    /// Fixed delay before each retry sub-batch (rate limiting).
    /// No delay is inserted between initial-pass batches.
    pub retry_sleep: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            retry_batch_size: 25,
            max_retries: 2,
            apply_clean: true,
            cleaner: CleanerConfig::default(),
            retry_sleep: Duration::ZERO,
        }
    }
}

// ─── Results ───────────────────────────────────────────────────

/// A resolved definition: raw model text plus its cleaned form.
/// Both empty for words that stayed unresolved after all rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub raw: String,
    pub cleaned: String,
}

/// Outcome of one enrichment run.
#[derive(Debug)]
pub struct EnrichOutcome {
    /// Cumulative word→definition mapping, one entry per input word.
    pub results: HashMap<String, Definition>,
    /// Words finalized with empty definitions after retries ran out.
    pub missing: Vec<String>,
    /// Retry rounds actually used.
    pub retry_rounds: usize,
    /// Total record lines that failed to decode, across all rounds.
    pub parse_errors: usize,
}

/// Mutable per-run state threaded through dispatch and retry.
struct RunState {
    results: HashMap<String, Definition>,
    missing: Vec<String>,
    parse_errors: usize,
}

// ─── Engine ────────────────────────────────────────────────────

/// Drives batched generation against a `DefinitionSource`.
pub struct EnrichEngine<'a> {
    source: &'a dyn DefinitionSource,
    config: EngineConfig,
}

impl<'a> EnrichEngine<'a> {
    pub fn new(source: &'a dyn DefinitionSource, config: EngineConfig) -> Self {
        Self { source, config }
    }

    /// Resolve a definition for every word in `words`.
    ///
    /// Words must be unique; duplicate input rows are expected to be
    /// resolved by the caller from the shared result mapping.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError` on transport failure. Content-level
    /// omissions never error; they end up in `EnrichOutcome::missing`.
    pub fn run(&self, words: &[String]) -> Result<EnrichOutcome, EnrichError> {
        let batch_size = self.config.batch_size.max(1);
        let mut state = RunState {
            results: HashMap::new(),
            missing: Vec::new(),
            parse_errors: 0,
        };

        // Initial pass over all batches.
        let batches: Vec<&[String]> = words.chunks(batch_size).collect();
        let total = batches.len();
        for (bi, batch) in batches.iter().enumerate() {
            let raw = self.dispatch(batch, &mut state)?;
            let resolved = self.absorb(batch, &raw, &mut state);
            eprintln!("[batch {}/{}] got {}/{}", bi + 1, total, resolved, batch.len());
        }

        // Retry rounds over the shrinking missing set.
        let retry_size = self.config.retry_batch_size.max(1);
        let mut rounds = 0;
        while !state.missing.is_empty() && rounds < self.config.max_retries {
            rounds += 1;
            let missing = std::mem::take(&mut state.missing);
            eprintln!(
                "[retry {}/{}] {} word(s) unresolved",
                rounds,
                self.config.max_retries,
                missing.len()
            );
            for sub in missing.chunks(retry_size) {
                if !self.config.retry_sleep.is_zero() {
                    thread::sleep(self.config.retry_sleep);
                }
                let raw = self.dispatch(sub, &mut state)?;
                self.absorb(sub, &raw, &mut state);
            }
        }

        // Finalize permanent failures with empty definitions.
        let missing = std::mem::take(&mut state.missing);
        for word in &missing {
            state.results.entry(word.clone()).or_insert_with(|| Definition {
                raw: String::new(),
                cleaned: String::new(),
            });
        }

        Ok(EnrichOutcome {
            results: state.results,
            missing,
            retry_rounds: rounds,
            parse_errors: state.parse_errors,
        })
    }

    /// Issue one generation request for a batch and decode its records.
    fn dispatch(
        &self,
        batch: &[String],
        state: &mut RunState,
    ) -> Result<HashMap<String, String>, EnrichError> {
        let prompt = batch.join("\n");
        let content = self.source.generate(&prompt)?;
        let (records, errors) = protocol::decode_records(&content);
        state.parse_errors += errors.len();
        Ok(records)
    }

    /// Check a batch off against decoded records. Non-empty definitions
    /// resolve into the cumulative mapping (cleaned when enabled); the
    /// rest go to the missing set. Unrequested words are ignored.
    fn absorb(
        &self,
        batch: &[String],
        records: &HashMap<String, String>,
        state: &mut RunState,
    ) -> usize {
        let mut resolved = 0;
        for word in batch {
            match records.get(word) {
                Some(defn) if !defn.trim().is_empty() => {
                    let cleaned = if self.config.apply_clean {
                        cleaner::clean(defn, &self.config.cleaner)
                    } else {
                        defn.clone()
                    };
                    state.results.insert(
                        word.clone(),
                        Definition {
                            raw: defn.clone(),
                            cleaned,
                        },
                    );
                    resolved += 1;
                }
                _ => state.missing.push(word.clone()),
            }
        }
        resolved
    }
}
