use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::auth::directory::{sync_user, ExternalProfile};
use crate::auth::session;
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// POST /auth/login — exchange a verified provider profile for a first-party
/// session. Creates the user row lazily on first login.
async fn login(
    State(state): State<AppState>,
    Json(profile): Json<ExternalProfile>,
) -> AppResult<Response> {
    let user = sync_user(&state.db, &profile)?;
    let token = session::create_session(&state.db, &user.id, state.config.auth.session_hours)?;

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "user": user })),
    )
        .into_response())
}

/// POST /auth/logout — drop the session row and clear the cookie.
async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> AppResult<Response> {
    let cookie_name = state.config.auth.cookie_name.clone();

    if let Some(token) = extract_cookie(&headers, &cookie_name) {
        session::delete_session(&state.db, &token)?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&cookie_name))],
        Json(json!({ "success": true })),
    )
        .into_response())
}

fn extract_cookie(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val.to_string())
            } else {
                None
            }
        })
}
