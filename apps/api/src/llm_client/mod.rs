/// LLM client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// Handlers depend on the `ChatCompletion` trait so tests can script the model.
///
/// The provider speaks the OpenAI-compatible `/chat/completions` protocol; model,
/// credential and base URL come from `Config` and are fixed for the process lifetime.
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod sse;

use sse::{SseDecoder, SsePayload};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider reported an error mid-stream: {0}")]
    Stream(String),

    #[error("LLM returned no choices")]
    EmptyResponse,
}

/// One prior turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Result of a non-streaming call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub reasoning: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Reasoning,
    Content,
}

/// One incremental piece of model output. Serializes as `{"type": ..., "text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamFragment {
    #[serde(rename = "type")]
    pub kind: FragmentKind,
    pub text: String,
}

impl StreamFragment {
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Reasoning,
            text: text.into(),
        }
    }

    pub fn content(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Content,
            text: text.into(),
        }
    }

    pub fn is_reasoning(&self) -> bool {
        self.kind == FragmentKind::Reasoning
    }
}

/// Lazy, finite, non-restartable sequence of fragments in provider order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamFragment, LlmError>> + Send>>;

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends one request and waits for the whole answer.
    async fn complete_once(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<Completion, LlmError>;

    /// Opens a streaming request. Errors before the first byte are returned here;
    /// errors after that end the stream with a final `Err` item.
    async fn complete_stream(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<FragmentStream, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// The production gateway: an OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    /// Caps one-shot calls only; a streamed body runs until the provider closes it.
    request_timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .build()?,
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            request_timeout: Duration::from_secs(config.llm_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream,
        };

        debug!(
            model = %self.model,
            stream,
            messages = messages.len(),
            prompt_chars = messages.iter().map(|m| m.content.chars().count()).sum::<usize>(),
            "Sending chat completion request"
        );

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);
        if !stream {
            request = request.timeout(self.request_timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete_once(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<Completion, LlmError> {
        let messages = format_messages(prompt, history, system_prompt);
        let response: ChatResponse = self.send(&messages, false).await?.json().await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        Ok(Completion {
            reasoning: choice.message.reasoning_content.unwrap_or_default(),
            content: choice.message.content.unwrap_or_default(),
        })
    }

    async fn complete_stream(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<FragmentStream, LlmError> {
        let messages = format_messages(prompt, history, system_prompt);
        let response = self.send(&messages, true).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(LlmError::Http));
        Ok(decode_fragment_stream(bytes))
    }
}

/// Builds the provider message list: optional system prompt, history in order,
/// then the user prompt (sent even when empty).
pub fn format_messages(
    prompt: &str,
    history: &[ChatMessage],
    system_prompt: Option<&str>,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::new("system", system));
    }
    messages.extend_from_slice(history);
    messages.push(ChatMessage::new("user", prompt));
    messages
}

// ────────────────────────────────────────────────────────────────────────────
// Stream decoding
// ────────────────────────────────────────────────────────────────────────────

struct DecodeState {
    bytes: Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>,
    decoder: SseDecoder,
    /// Fragments decoded from the most recent network chunk only.
    pending: VecDeque<Result<StreamFragment, LlmError>>,
    finished: bool,
}

impl DecodeState {
    fn absorb(&mut self, payloads: impl IntoIterator<Item = SsePayload>) {
        for payload in payloads {
            match payload {
                SsePayload::Done => {
                    self.finished = true;
                    return;
                }
                SsePayload::Data(data) => match fragments_from_chunk(&data) {
                    Ok(fragments) => self.pending.extend(fragments.into_iter().map(Ok)),
                    Err(e) => {
                        self.pending.push_back(Err(e));
                        self.finished = true;
                        return;
                    }
                },
            }
        }
    }
}

/// Turns a raw SSE byte stream into classified fragments. The stream ends at
/// `[DONE]`, at connection close, or right after the first error it yields.
pub fn decode_fragment_stream<S>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(next) = state.pending.pop_front() {
                return Some((next, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let payloads = state.decoder.push(&chunk);
                    state.absorb(payloads);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    let tail = state.decoder.finish();
                    state.absorb(tail);
                    state.finished = true;
                }
            }
        }
    }))
}

/// Classifies one chunk by which delta field is populated. Reasoning is yielded
/// before content when a chunk carries both; empty deltas yield nothing.
fn fragments_from_chunk(data: &str) -> Result<Vec<StreamFragment>, LlmError> {
    let chunk: ChatChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Stream(error.message));
    }

    let Some(delta) = chunk.choices.into_iter().next().and_then(|c| c.delta) else {
        return Ok(Vec::new());
    };

    let mut fragments = Vec::new();
    if let Some(text) = delta.reasoning_content.filter(|t| !t.is_empty()) {
        fragments.push(StreamFragment::reasoning(text));
    }
    if let Some(text) = delta.content.filter(|t| !t.is_empty()) {
        fragments.push(StreamFragment::content(text));
    }
    Ok(fragments)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
