//! Axum route handlers for scene design.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::forms::UploadForm;
use crate::models::scene::SceneSpec;
use crate::scene::synthesizer::synthesize_scene;
use crate::state::AppState;

/// POST /optimize_course_scense
///
/// Multipart form: `scene_description`, optional `file` (pdf/png/jpg/jpeg).
/// The upload's format is checked before any LLM call is made.
/// A blank description is rejected with 400 unless the upload supplied
/// reference text, so the model is never asked to design a scene from nothing.
pub async fn handle_optimize_scene(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SceneSpec>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let description = form.text("scene_description");
    let reference = form.reference_text(state.ocr.as_ref()).await?;

    if description.trim().is_empty() && reference.as_deref().map_or(true, |r| r.trim().is_empty()) {
        return Err(AppError::Validation(
            "scene_description cannot be empty".to_string(),
        ));
    }

    let scene = synthesize_scene(state.llm.as_ref(), description, reference.as_deref()).await?;
    Ok(Json(scene))
}
