pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::course::handlers as course;
use crate::dialogue::handlers as dialogue;
use crate::scene::handlers as scene;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/test", get(health::health_handler))
        .route("/optimize_course_scense", post(scene::handle_optimize_scene))
        .route("/ai_create_course", post(course::handle_create_course))
        .route("/adjust_ai_create_course", post(course::handle_adjust_course))
        .route("/save_course", post(dialogue::handle_save_course))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
