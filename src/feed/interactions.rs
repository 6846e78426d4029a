use rusqlite::params;

use crate::db::models::Comment;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Toggle a like for (user, post). Returns the new liked state.
///
/// The insert leans on the UNIQUE(user_id, post_id) index instead of a
/// read-then-write, so two concurrent toggles cannot double-insert.
pub fn toggle_like(pool: &DbPool, user_id: &str, post_id: &str) -> AppResult<bool> {
    let conn = pool.get()?;

    ensure_post_exists(&conn, post_id)?;

    let id = uuid::Uuid::now_v7().to_string();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO likes (id, user_id, post_id) VALUES (?1, ?2, ?3)",
        params![id, user_id, post_id],
    )?;

    if inserted > 0 {
        return Ok(true);
    }

    conn.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
    )?;
    Ok(false)
}

pub fn create_comment(
    pool: &DbPool,
    author_id: &str,
    post_id: &str,
    content: &str,
) -> AppResult<Comment> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("content is required".into()));
    }

    let conn = pool.get()?;
    ensure_post_exists(&conn, post_id)?;

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO comments (id, post_id, author_id, content) VALUES (?1, ?2, ?3, ?4)",
        params![id, post_id, author_id, content],
    )?;

    conn.query_row(
        "SELECT id, post_id, author_id, content, created_at FROM comments WHERE id = ?1",
        params![id],
        |row| {
            Ok(Comment {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .map_err(AppError::from)
}

/// Author-only comment delete.
pub fn delete_comment(pool: &DbPool, viewer_id: &str, comment_id: &str) -> AppResult<()> {
    let conn = pool.get()?;

    let author_id: String = conn
        .query_row(
            "SELECT author_id FROM comments WHERE id = ?1",
            params![comment_id],
            |row| row.get(0),
        )
        .map_err(|_| AppError::NotFound)?;

    if author_id != viewer_id {
        return Err(AppError::Forbidden);
    }

    conn.execute("DELETE FROM comments WHERE id = ?1", params![comment_id])?;
    Ok(())
}

fn ensure_post_exists(conn: &rusqlite::Connection, post_id: &str) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}
