use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::nft::{place_bid, record_mint, set_for_sale, MintParams};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts/{id}/nft", post(mint))
        .route("/api/nfts/{id}/bids", post(bid))
        .route("/api/nfts/{id}/sale", post(sale))
        .route("/api/pin", post(pin_metadata))
}

#[derive(Deserialize)]
struct BidRequest {
    amount: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleRequest {
    for_sale: bool,
    price: Option<String>,
}

/// POST /api/posts/{id}/nft — record the token the client just minted. The
/// authenticated caller becomes the owner.
async fn mint(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    Json(params): Json<MintParams>,
) -> AppResult<Json<Value>> {
    let nft = record_mint(&state.db, &post_id, &user.id, &params)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "nft": nft })))
}

async fn bid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(nft_id): Path<String>,
    Json(req): Json<BidRequest>,
) -> AppResult<Json<Value>> {
    let bid = place_bid(&state.db, &nft_id, &user.id, &req.amount)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "bid": bid })))
}

async fn sale(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(nft_id): Path<String>,
    Json(req): Json<SaleRequest>,
) -> AppResult<Json<Value>> {
    let nft = set_for_sale(
        &state.db,
        &nft_id,
        &user.id,
        req.for_sale,
        req.price.as_deref(),
    )?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "nft": nft })))
}

/// POST /api/pin — proxy NFT metadata to the pinning service so the client
/// never holds the service token.
async fn pin_metadata(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(metadata): Json<Value>,
) -> AppResult<Json<Value>> {
    let client = state
        .pinning
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("no pinning service configured".into()))?;

    let pinned = client.pin_json(&metadata).await?;
    Ok(Json(
        json!({ "success": true, "hash": pinned.hash, "uri": pinned.uri }),
    ))
}
