//! Wire protocol decoding for the streaming chat exchange.
//!
//! Two layers, both line-oriented and both tolerant of garbage:
//!
//! 1. `collect_stream`: the transport produces newline-delimited JSON
//!    event fragments; each carries an optional `message.content` text
//!    piece and a `done` marker. Pieces are concatenated into the full
//!    response text.
//! 2. `decode_records`: the accumulated text is itself expected to be
//!    NDJSON, one `{"word": ..., "definition": ...}` object per line.
//!    Bad lines are recorded as parse errors and skipped.

use std::collections::HashMap;
use std::io::BufRead;

/// Read a streaming chat response and concatenate its content pieces.
///
/// Fragments that fail to decode, or whose `message.content` is absent
/// or not a string, are skipped. Reading stops after the fragment with
/// `done: true`, or when the stream closes.
///
/// # Errors
///
/// Propagates I/O errors from the underlying reader; a dead stream is
/// a transport failure, not a content failure.
pub fn collect_stream<R: BufRead>(reader: R) -> std::io::Result<String> {
    let mut text = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => continue, // malformed fragment: keep reading
        };
        if let Some(piece) = value
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            text.push_str(piece);
        }
        if value.get("done").and_then(|d| d.as_bool()) == Some(true) {
            break;
        }
    }

    Ok(text)
}

/// Decode accumulated response text as NDJSON (word, definition) records.
///
/// Returns the word→definition mapping plus a list of human-readable
/// parse errors for lines that were not a JSON object with string
/// `word` and `definition` fields. Duplicate words: latest write wins.
pub fn decode_records(content: &str) -> (HashMap<String, String>, Vec<String>) {
    let mut records: HashMap<String, String> = HashMap::new();
    let mut errors: Vec<String> = Vec::new();

    let lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    for (idx, line) in lines.enumerate() {
        let lineno = idx + 1;
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                errors.push(format!(
                    "line {}: invalid JSON ({}): {}",
                    lineno,
                    e,
                    excerpt(line)
                ));
                continue;
            }
        };
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                errors.push(format!("line {}: JSON not an object", lineno));
                continue;
            }
        };
        let word = obj.get("word").and_then(|w| w.as_str());
        let definition = obj.get("definition").and_then(|d| d.as_str());
        match (word, definition) {
            (Some(w), Some(d)) => {
                records.insert(w.to_string(), d.to_string());
            }
            _ => errors.push(format!("line {}: word/definition not strings", lineno)),
        }
    }

    (records, errors)
}

/// Truncate a bad line for error reporting.
fn excerpt(line: &str) -> String {
    line.chars().take(160).collect()
}
