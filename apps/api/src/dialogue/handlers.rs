//! Axum route handler for saving a generated course.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dialogue::parser::parse_transcript;
use crate::dialogue::store::save_transcript;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveCourseRequest {
    #[serde(default)]
    pub course_content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveCourseResponse {
    pub message: String,
    pub turns: usize,
}

/// POST /save_course
///
/// Parses the transcript and overwrites the course file with its turns.
pub async fn handle_save_course(
    State(state): State<AppState>,
    Json(request): Json<SaveCourseRequest>,
) -> Result<Json<SaveCourseResponse>, AppError> {
    let turns = parse_transcript(&request.course_content)?;
    save_transcript(&state.config.course_file, &turns).await?;

    let complete = turns.iter().filter(|t| t.is_complete()).count();
    info!(
        "Saved course to {} ({} complete turns, {} partial)",
        state.config.course_file.display(),
        complete,
        turns.len() - complete
    );

    Ok(Json(SaveCourseResponse {
        message: "Course saved".to_string(),
        turns: turns.len(),
    }))
}
