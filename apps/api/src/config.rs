use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
const DEFAULT_MODEL: &str = "deepseek-r1";

/// Application configuration loaded from environment variables.
/// Built once at startup; handlers never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Whole-request cap for non-streaming calls. Streams are never cut short.
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    /// Fixed path the dialogue transcript is written to on every save.
    pub course_file: PathBuf,
    pub tesseract_cmd: String,
    pub ocr_lang: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_api_key = require_env("LLM_API_KEY")
            .or_else(|_| require_env("DASHSCOPE_API_KEY"))
            .context("Set LLM_API_KEY (or DASHSCOPE_API_KEY) to the provider credential")?;

        Ok(Config {
            llm_api_key,
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 300)?,
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
            course_file: PathBuf::from(env_or("COURSE_FILE", "course_dialogue.json")),
            tesseract_cmd: env_or("TESSERACT_CMD", "tesseract"),
            ocr_lang: env_or("OCR_LANG", "eng"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests; points the gateway nowhere.
    pub fn for_tests(course_file: PathBuf) -> Self {
        Config {
            llm_api_key: "test-key".to_string(),
            llm_base_url: "http://127.0.0.1:9".to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 5,
            port: 0,
            rust_log: "debug".to_string(),
            course_file,
            tesseract_cmd: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
            max_upload_bytes: 1024 * 1024,
        }
    }
}
