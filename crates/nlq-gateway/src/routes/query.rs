//! Query endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use nlq_core::{QueryRequest, QueryResponse};

use crate::error::AppError;
use crate::AppState;

/// Query routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/query", post(handle_query))
}

/// Answer a natural-language question.
async fn handle_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(request) = body?;
    let response = state.engine.ask(&request).await?;
    Ok(Json(response))
}
