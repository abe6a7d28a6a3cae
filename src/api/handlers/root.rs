use axum::response::{IntoResponse, Json};
use serde_json::json;

// Welcome handler for `/`, intentionally outside the OpenAPI document.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the blog post api!" }))
}
