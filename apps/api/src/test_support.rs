//! Scripted collaborators shared by handler and pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;
use image::DynamicImage;

use crate::extract::{ExtractError, OcrEngine};
use crate::llm_client::{
    ChatCompletion, ChatMessage, Completion, FragmentStream, LlmError, StreamFragment,
};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub prompt: String,
    pub history: Vec<ChatMessage>,
    pub system_prompt: Option<String>,
}

/// A `ChatCompletion` that replays a fixed answer and records what it was asked.
#[derive(Default)]
pub struct ScriptedLlm {
    completion: Option<Completion>,
    fragments: Vec<StreamFragment>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedLlm {
    pub fn with_completion(completion: Completion) -> Self {
        Self {
            completion: Some(completion),
            ..Self::default()
        }
    }

    pub fn with_fragments(fragments: Vec<StreamFragment>) -> Self {
        Self {
            fragments,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(&self, prompt: &str, history: &[ChatMessage], system_prompt: Option<&str>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            prompt: prompt.to_string(),
            history: history.to_vec(),
            system_prompt: system_prompt.map(String::from),
        });
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete_once(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<Completion, LlmError> {
        self.record(prompt, history, system_prompt);
        self.completion.clone().ok_or(LlmError::EmptyResponse)
    }

    async fn complete_stream(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<FragmentStream, LlmError> {
        self.record(prompt, history, system_prompt);
        let items: Vec<Result<StreamFragment, LlmError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// OCR stand-in that always reads the same text.
pub struct FixedOcr(pub &'static str);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: DynamicImage) -> Result<String, ExtractError> {
        Ok(self.0.to_string())
    }
}
