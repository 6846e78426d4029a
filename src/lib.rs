// Library exports so integration tests and external code can use mintfeed
// modules.

pub mod agent;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod nft;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// The full HTTP surface, ready for `.with_state(state)`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::feed::router())
        .merge(routes::nft::router())
        .merge(routes::wallet::router())
        .merge(routes::agent::router())
}
