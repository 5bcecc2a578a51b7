use axum::Json;
use serde_json::{json, Value};

/// GET /test
/// Liveness probe used by the front end.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "message": "Server is running!" }))
}
