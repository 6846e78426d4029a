use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::directory::link_wallet;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/walletConnect", post(wallet_connect))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletConnectRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    wallet_address: String,
}

/// POST /api/walletConnect — attach a wallet address to a user.
///
/// A missing wallet address answers 411 with `{"message":"Invalid inputs"}`;
/// clients depend on that exact status.
async fn wallet_connect(
    State(state): State<AppState>,
    Json(req): Json<WalletConnectRequest>,
) -> AppResult<Json<Value>> {
    if req.wallet_address.is_empty() {
        return Err(AppError::LengthRequired);
    }
    if req.username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }

    let user = link_wallet(&state.db, &req.username, &req.wallet_address)?;
    tracing::info!(username = %user.username, "Linked wallet");
    Ok(Json(json!({ "success": true, "user": user })))
}
