use std::sync::Arc;

use crate::config::Config;
use crate::extract::OcrEngine;
use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// The LLM gateway. `LlmClient` in production.
    pub llm: Arc<dyn ChatCompletion>,
    /// OCR for image uploads. `TesseractOcr` in production.
    pub ocr: Arc<dyn OcrEngine>,
    pub config: Config,
}
