use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::feed::assemble::{get_posts, FeedPost};
use crate::feed::{interactions, posts};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(feed_page).post(create_post))
        .route("/api/posts/{id}", delete(delete_post))
        .route("/api/posts/{id}/like", post(toggle_like))
        .route("/api/posts/{id}/comments", post(create_comment))
        .route("/api/comments/{id}", delete(delete_comment))
}

#[derive(Deserialize)]
struct FeedQuery {
    #[serde(default)]
    page: u32,
}

#[derive(Deserialize)]
struct CreatePostRequest {
    content: String,
    #[serde(default)]
    image: String,
}

#[derive(Deserialize)]
struct CreateCommentRequest {
    content: String,
}

/// GET /api/posts?page=N — one feed page, newest first. Page zero is served
/// from the feed cache when it is warm.
async fn feed_page(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    maybe_user: MaybeUser,
) -> AppResult<Json<Value>> {
    let page_size = state.config.feed.page_size;

    let page = if query.page == 0 {
        match state.feed_cache.get() {
            Some(cached) => cached,
            None => {
                let assembled = get_posts(&state.db, 0, page_size)?;
                state.feed_cache.put(assembled.clone());
                assembled
            }
        }
    } else {
        get_posts(&state.db, query.page, page_size)?
    };

    let viewer = maybe_user.0;
    let posts: Vec<Value> = page
        .iter()
        .map(|post| annotate_for_viewer(post, viewer.as_ref().map(|u| u.id.as_str())))
        .collect::<Result<_, _>>()?;

    Ok(Json(json!({ "success": true, "posts": posts })))
}

fn annotate_for_viewer(post: &FeedPost, viewer_id: Option<&str>) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(post)?;
    let liked = viewer_id.map_or(false, |id| post.liked_by(id));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("likedByViewer".to_string(), Value::Bool(liked));
    }
    Ok(value)
}

/// POST /api/posts — authenticated authors only; an unauthenticated caller
/// is rejected before any row is written.
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<Json<Value>> {
    let post = posts::create_post(&state.db, &user.id, &req.content, &req.image)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "post": post })))
}

async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    posts::delete_post(&state.db, &user.id, &post_id)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true })))
}

async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let liked = interactions::toggle_like(&state.db, &user.id, &post_id)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "liked": liked })))
}

async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<Value>> {
    let comment = interactions::create_comment(&state.db, &user.id, &post_id, &req.content)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true, "comment": comment })))
}

async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(comment_id): Path<String>,
) -> AppResult<Json<Value>> {
    interactions::delete_comment(&state.db, &user.id, &comment_id)?;
    state.feed_cache.invalidate();
    Ok(Json(json!({ "success": true })))
}
