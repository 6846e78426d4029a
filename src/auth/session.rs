use rand::Rng;
use rusqlite::params;

use crate::error::AppResult;
use crate::state::DbPool;

/// Insert a session row for a user and hand back its bearer token. Expiry
/// is computed in the database so it stays consistent with the
/// `datetime('now')` comparisons used at lookup time.
pub fn create_session(pool: &DbPool, user_id: &str, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Remove the session behind a token, if any. Used by logout.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Drop sessions past their expiry. Returns how many rows went away.
/// Expired sessions are already rejected at lookup; this keeps the table
/// from growing without bound.
pub fn prune_expired(pool: &DbPool) -> AppResult<usize> {
    let conn = pool.get()?;
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    if removed > 0 {
        tracing::debug!(removed, "Pruned expired sessions");
    }
    Ok(removed)
}

/// 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
