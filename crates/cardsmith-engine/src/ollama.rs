//! Streaming chat client for a local Ollama instance.
//!
//! One blocking POST per batch to `/api/chat` with `stream: true`.
//! The NDJSON event stream is folded into the full response text by
//! `protocol::collect_stream`. Transport failures propagate and abort
//! the run; retries elsewhere target omitted words, not dead sockets.

use std::io::BufReader;
use std::time::Duration;

use serde::Serialize;

use crate::error::EnrichError;
use crate::protocol;
use crate::source::DefinitionSource;

pub const DEFAULT_CHAT_URL: &str = "http://127.0.0.1:11434/api/chat";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

// ─── Ollama API Types ─────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

// ─── OllamaClient ─────────────────────────────────────────────────

/// Blocking streaming client for the Ollama chat API.
pub struct OllamaClient {
    agent: ureq::Agent,
    url: String,
    model: String,
    system_prompt: String,
    temperature: Option<f64>,
    top_p: Option<f64>,
}

impl OllamaClient {
    /// Create a client for one run.
    ///
    /// - `url`: full `/api/chat` URL (see `DEFAULT_CHAT_URL`)
    /// - `model`: Ollama model name (e.g. "qwen2.5:32b")
    /// - `system_prompt`: instructions sent as the system message
    /// - `timeout`: global per-request timeout
    pub fn new(url: &str, model: &str, system_prompt: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            url: url.to_string(),
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            temperature: None,
            top_p: None,
        }
    }

    /// Set sampling parameters. When both are `None`, the request
    /// carries no `options` object at all.
    pub fn with_sampling(mut self, temperature: Option<f64>, top_p: Option<f64>) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    fn options(&self) -> Option<ChatOptions> {
        if self.temperature.is_none() && self.top_p.is_none() {
            return None;
        }
        Some(ChatOptions {
            temperature: self.temperature,
            top_p: self.top_p,
        })
    }
}

impl DefinitionSource for OllamaClient {
    fn generate(&self, user_prompt: &str) -> Result<String, EnrichError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: true,
            options: self.options(),
        };

        let mut resp = self.agent.post(&self.url).send_json(&request)?;
        let reader = BufReader::new(resp.body_mut().as_reader());
        Ok(protocol::collect_stream(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_absent_when_no_sampling_params() {
        let client = OllamaClient::new(DEFAULT_CHAT_URL, "test", "prompt", DEFAULT_TIMEOUT);
        assert!(client.options().is_none());

        let client = client.with_sampling(Some(0.0), None);
        let opts = client.options().unwrap();
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.top_p, None);
    }

    #[test]
    fn request_serializes_two_message_exchange() {
        let request = ChatRequest {
            model: "qwen2.5:32b",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "comer\nbeber",
                },
            ],
            stream: true,
            options: Some(ChatOptions {
                temperature: Some(0.0),
                top_p: Some(1.0),
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "comer\nbeber");
        assert_eq!(json["options"]["temperature"], 0.0);
    }
}
