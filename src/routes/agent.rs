use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::agent::run_agent;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/run-agent", post(run))
}

/// POST /api/run-agent — execute the configured minting agent script and
/// return its stdout.
async fn run(State(state): State<AppState>, _user: CurrentUser) -> AppResult<Json<Value>> {
    let output = run_agent(&state.config.agent).await?;
    Ok(Json(
        json!({ "message": output.message, "stdout": output.stdout }),
    ))
}
