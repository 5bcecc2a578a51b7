//! Axum route handlers for streamed course generation.

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, Sse},
};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;

use crate::course::prompts::{build_course_prompt, CourseAdjustment, CourseBrief};
use crate::course::relay::spawn_relay;
use crate::errors::AppError;
use crate::forms::UploadForm;
use crate::models::scene::coerce_turn_count;
use crate::state::AppState;

/// POST /ai_create_course
///
/// Multipart form: scene fields, `diag_turns`, optional `file`.
/// Responds with `text/event-stream`, one `{"type", "text"}` event per fragment.
pub async fn handle_create_course(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let brief = brief_from_form(&form);
    let reference = form.reference_text(state.ocr.as_ref()).await?;

    let prompt = build_course_prompt(&brief, reference.as_deref(), None);
    stream_course(&state, &prompt).await
}

/// POST /adjust_ai_create_course
///
/// Same as course creation plus `course_content` (the previous dialogue) and
/// `adjust_instruction` (what to change).
pub async fn handle_adjust_course(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let brief = brief_from_form(&form);

    let adjustment = CourseAdjustment {
        previous_content: required(&form, "course_content")?,
        instruction: required(&form, "adjust_instruction")?,
    };
    let reference = form.reference_text(state.ocr.as_ref()).await?;

    let prompt = build_course_prompt(&brief, reference.as_deref(), Some(&adjustment));
    stream_course(&state, &prompt).await
}

/// Opens the upstream stream before any response bytes are written, so a
/// failing provider still yields a proper error status.
async fn stream_course(
    state: &AppState,
    system_prompt: &str,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let fragments = state
        .llm
        .complete_stream("", &[], Some(system_prompt))
        .await?;

    let events = ReceiverStream::new(spawn_relay(fragments))
        .map(|fragment| Event::default().json_data(&fragment));

    Ok(Sse::new(events))
}

fn brief_from_form(form: &UploadForm) -> CourseBrief {
    CourseBrief {
        scene_description: form.text("scene_description").to_string(),
        scene_name: form.text("sceneName").to_string(),
        scene_goal: form.text("sceneGoal").to_string(),
        ai_role: form.text("aiRole").to_string(),
        my_role: form.text("myRole").to_string(),
        opening_line: form.text("openingLine").to_string(),
        instructions: form.text("instructions").to_string(),
        turn_count: coerce_turn_count(form.get("diag_turns")),
    }
}

fn required(form: &UploadForm, name: &str) -> Result<String, AppError> {
    match form.get(name).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AppError::Validation(format!("{name} cannot be empty"))),
    }
}
