use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::{arduino, health};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(health::healthz_handler, arduino::get_surf_data),
    components(schemas(health::HealthResponse, arduino::SurfDataResponse))
)]
struct ApiDoc;

pub fn openapi_json() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_else(|err| {
        serde_json::json!({"error": format!("failed to render openapi document: {err}")})
    })
}

async fn openapi_handler() -> Json<serde_json::Value> {
    Json(openapi_json())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_handler))
}
