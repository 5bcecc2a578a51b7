//! Scene synthesis: one non-streaming LLM call, then a strict parse of the
//! returned JSON into a `SceneSpec`.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, ChatCompletion};
use crate::models::scene::{coerce_turn_count, SceneSpec, DEFAULT_TURN_COUNT};
use crate::scene::prompts::build_scene_prompt;

/// The model's answer before it is reshaped for display. Text fields may be
/// missing or `null`; both render as empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDraft {
    #[serde(default)]
    pub scene_name: Option<String>,
    #[serde(default)]
    pub scene_goal: Option<String>,
    #[serde(default)]
    pub ai_role: Option<String>,
    #[serde(default)]
    pub my_role: Option<String>,
    #[serde(default)]
    pub opening_line: Option<String>,
    #[serde(default)]
    pub instructions: Option<Instructions>,
    /// Not requested, but honoured when the model volunteers one.
    #[serde(default)]
    pub turn_count: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    List(Vec<String>),
    Text(String),
}

impl Instructions {
    /// Renders a list as `" 1. a\n 2. b"`; a single string passes through trimmed.
    pub fn render(&self) -> String {
        match self {
            Instructions::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| format!(" {}. {}", i + 1, item))
                .collect::<Vec<_>>()
                .join("\n"),
            Instructions::Text(text) => text.trim().to_string(),
        }
    }
}

impl SceneDraft {
    pub fn into_spec(self, reasoning: String) -> SceneSpec {
        let turn_count = match &self.turn_count {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_TURN_COUNT),
            Some(Value::String(s)) => coerce_turn_count(Some(s.as_str())),
            _ => DEFAULT_TURN_COUNT,
        };

        SceneSpec {
            scene_name: self.scene_name.unwrap_or_default(),
            scene_goal: self.scene_goal.unwrap_or_default(),
            ai_role: self.ai_role.unwrap_or_default(),
            my_role: self.my_role.unwrap_or_default(),
            opening_line: self.opening_line.unwrap_or_default(),
            instructions: self
                .instructions
                .as_ref()
                .map(Instructions::render)
                .unwrap_or_default(),
            turn_count,
            reasoning,
        }
    }
}

/// Parses model output, tolerating a fenced code block around the JSON object.
pub fn parse_scene_draft(content: &str) -> Result<SceneDraft, AppError> {
    let json = strip_json_fences(content);
    serde_json::from_str(json).map_err(|e| AppError::Parse(e.to_string()))
}

/// Designs a training scene from a description and optional reference text.
pub async fn synthesize_scene(
    llm: &dyn ChatCompletion,
    description: &str,
    reference: Option<&str>,
) -> Result<SceneSpec, AppError> {
    let prompt = build_scene_prompt(description, reference);
    let completion = llm
        .complete_once(&prompt.user, &[], Some(prompt.system))
        .await?;

    debug!(
        content_chars = completion.content.chars().count(),
        reasoning_chars = completion.reasoning.chars().count(),
        "Scene design response received"
    );

    let draft = parse_scene_draft(&completion.content)?;
    debug!(draft = ?draft, "Parsed scene draft");

    let spec = draft.into_spec(completion.reasoning);
    info!("Scene designed: {}", spec.scene_name);
    Ok(spec)
}
