//! Schema endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use nlq_core::SourceSchema;

use crate::error::AppError;
use crate::json::SchemaResponse;
use crate::AppState;

/// Schema routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schema", get(handle_list_sources))
        .route("/schema/:source", get(handle_describe_source))
}

/// List every registered source.
async fn handle_list_sources(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        sources: state.engine.registry().sources().cloned().collect(),
    })
}

/// Describe one source.
async fn handle_describe_source(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<SourceSchema>, AppError> {
    state
        .engine
        .registry()
        .describe(&source)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("unknown source: {}", source)))
}
