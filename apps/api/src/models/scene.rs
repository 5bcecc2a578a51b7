use serde::Serialize;

/// Turn count used whenever the caller or the model supplies none, or an invalid one.
pub const DEFAULT_TURN_COUNT: u32 = 10;

/// Structured result of scenario design, returned to the front end as-is.
/// Not stored server-side; the client resends these fields on later calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    pub scene_name: String,
    pub scene_goal: String,
    pub ai_role: String,
    pub my_role: String,
    pub opening_line: String,
    /// Numbered, newline-joined display form (" 1. ...\n 2. ...").
    pub instructions: String,
    pub turn_count: u32,
    pub reasoning: String,
}

/// Coerces a raw `diag_turns` value into a positive turn count.
/// Absent, blank, non-numeric, zero and negative values all become the default.
pub fn coerce_turn_count(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_TURN_COUNT)
}
