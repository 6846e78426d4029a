use rusqlite::{params, OptionalExtension};

use crate::db::models::Post;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub fn create_post(pool: &DbPool, author_id: &str, content: &str, image: &str) -> AppResult<Post> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("content is required".into()));
    }

    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO posts (id, author_id, content, image) VALUES (?1, ?2, ?3, ?4)",
        params![id, author_id, content, image],
    )?;

    let post = conn.query_row(
        "SELECT id, author_id, content, image, created_at FROM posts WHERE id = ?1",
        params![id],
        post_from_row,
    )?;

    tracing::debug!(post_id = %post.id, "Post created");
    Ok(post)
}

/// Author-only delete. Comments, likes and any NFT record go with the post
/// via foreign-key cascades.
pub fn delete_post(pool: &DbPool, viewer_id: &str, post_id: &str) -> AppResult<()> {
    let conn = pool.get()?;

    let author_id: Option<String> = conn
        .query_row(
            "SELECT author_id FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
        )
        .optional()?;

    let author_id = author_id.ok_or(AppError::NotFound)?;
    if author_id != viewer_id {
        return Err(AppError::Forbidden);
    }

    conn.execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;
    tracing::debug!(post_id = %post_id, "Post deleted");
    Ok(())
}

pub fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        content: row.get(2)?,
        image: row.get(3)?,
        created_at: row.get(4)?,
    })
}
