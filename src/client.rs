//! Model client: the single outbound call to the vision-model provider.
//!
//! One POST to the Anthropic Messages API per request, with a bounded
//! timeout, exactly one attempt. Resilience (retry, backoff, failover) is an
//! explicit non-goal: a failed call terminates the request with a typed
//! provider error and the caller decides what to do.
//!
//! The returned text is the provider's output verbatim. No post-processing,
//! no parsing of any structure the model might emit.

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::pipeline::request::ContentPart;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// What the provider sent back, untouched.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// Concatenated text of the response content, verbatim.
    pub text: String,
    /// Model that produced the response (as reported by the provider).
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// HTTP client for the vision-model endpoint.
///
/// Constructed once per service; reqwest pools connections internally, so
/// concurrent requests share it freely.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    messages_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl VisionClient {
    pub fn new(config: &AppConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            messages_url: format!("{}/v1/messages", config.api_base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Send the assembled content parts as one user message and return the
    /// model's text reply.
    pub async fn complete(&self, content: Vec<ContentPart>) -> Result<ProviderReply, AnalysisError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let start = Instant::now();
        let response = self
            .http
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else if e.is_connect() {
                    format!("connection failed: {e}")
                } else {
                    e.to_string()
                };
                AnalysisError::ProviderUnavailable { detail }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(AnalysisError::ProviderRejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = response.json().await.map_err(|e| {
            AnalysisError::Internal(format!("provider returned an unparseable response: {e}"))
        })?;

        let text: String = reply
            .content
            .iter()
            .filter(|part| part.kind == "text")
            .map(|part| part.text.as_str())
            .collect();

        info!(
            model = %reply.model,
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "provider call complete"
        );
        debug!(chars = text.len(), "provider reply text");

        Ok(ProviderReply {
            text,
            model: reply.model,
            input_tokens: reply.usage.input_tokens,
            output_tokens: reply.usage.output_tokens,
        })
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
    model: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}
