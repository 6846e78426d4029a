use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::db::models::User;
use crate::error::{constraint_to_conflict, AppError, AppResult};
use crate::state::DbPool;

/// Profile handed over by the external auth provider after it has verified
/// the user's identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProfile {
    pub auth_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Look up the user for an external identity, creating the row on first
/// login. The insert is keyed on the auth_id unique index and ignores
/// conflicts, so two concurrent first logins converge on a single row.
pub fn sync_user(pool: &DbPool, profile: &ExternalProfile) -> AppResult<User> {
    if profile.auth_id.is_empty() {
        return Err(AppError::BadRequest("auth_id is required".into()));
    }

    let conn = pool.get()?;

    if let Some(user) = find_by_auth_id(&conn, &profile.auth_id)? {
        return Ok(user);
    }

    let username = derive_username(profile)
        .ok_or_else(|| AppError::BadRequest("username or email is required".into()))?;
    let id = uuid::Uuid::now_v7().to_string();

    let inserted = conn
        .execute(
            "INSERT INTO users (id, auth_id, name, username, email, image, wallet_address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(auth_id) DO NOTHING",
            params![
                id,
                profile.auth_id,
                profile.name,
                username,
                profile.email,
                profile.image,
                profile.wallet_address,
            ],
        )
        .map_err(|e| constraint_to_conflict(e, "username"))?;

    if inserted > 0 {
        tracing::info!(username = %username, "Created user on first login");
    }

    // Re-select either way: a racing first login may have won the insert.
    find_by_auth_id(&conn, &profile.auth_id)?
        .ok_or_else(|| AppError::Internal("user row missing after sync".into()))
}

/// Attach a wallet address to an existing user, looked up by username.
pub fn link_wallet(pool: &DbPool, username: &str, wallet_address: &str) -> AppResult<User> {
    let conn = pool.get()?;

    let updated = conn.execute(
        "UPDATE users SET wallet_address = ?1 WHERE username = ?2",
        params![wallet_address, username],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    conn.query_row(
        "SELECT id, auth_id, name, username, email, image, wallet_address, created_at
         FROM users WHERE username = ?1",
        params![username],
        user_from_row,
    )
    .map_err(AppError::from)
}

pub fn find_by_auth_id(conn: &Connection, auth_id: &str) -> AppResult<Option<User>> {
    conn.query_row(
        "SELECT id, auth_id, name, username, email, image, wallet_address, created_at
         FROM users WHERE auth_id = ?1",
        params![auth_id],
        user_from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        auth_id: row.get(1)?,
        name: row.get(2)?,
        username: row.get(3)?,
        email: row.get(4)?,
        image: row.get(5)?,
        wallet_address: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Provider username when present, else the email local-part.
fn derive_username(profile: &ExternalProfile) -> Option<String> {
    if let Some(ref username) = profile.username {
        if !username.is_empty() {
            return Some(username.clone());
        }
    }
    let local = profile.email.split('@').next()?;
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}
