pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::state::DbPool;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_initial",
        include_str!("../../migrations/001_initial.sql"),
    ),
    ("002_nft", include_str!("../../migrations/002_nft.sql")),
];

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder().max_size(8).build(manager)?;

    // Configure SQLite for performance
    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )?;

    Ok(pool)
}

/// Single-connection in-memory pool, used by tests.
pub fn create_memory_pool() -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool() -> DbPool {
        create_memory_pool().unwrap()
    }

    #[test]
    fn create_pool_creates_db_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("sub/dir/test.db");
        let pool = create_pool(&db_path).unwrap();
        assert!(db_path.exists());
        // Verify we can get a connection
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn migrations_run_successfully() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        // Verify key tables exist
        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .filter_map(|r| r.ok())
                .collect()
        };
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"sessions".to_string()));
        assert!(tables.contains(&"posts".to_string()));
        assert!(tables.contains(&"comments".to_string()));
        assert!(tables.contains(&"likes".to_string()));
        assert!(tables.contains(&"nfts".to_string()));
        assert!(tables.contains(&"bids".to_string()));
    }

    #[test]
    fn migrations_are_idempotent() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap(); // Should not error on second run

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn like_uniqueness_enforced() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, auth_id, username) VALUES ('u1', 'ext-1', 'alice');
             INSERT INTO posts (id, author_id, content) VALUES ('p1', 'u1', 'hi');
             INSERT INTO likes (id, user_id, post_id) VALUES ('l1', 'u1', 'p1');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO likes (id, user_id, post_id) VALUES ('l2', 'u1', 'p1')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn foreign_keys_enforced() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        // Inserting a post with a non-existent author should fail
        let result = conn.execute(
            "INSERT INTO posts (id, author_id, content) VALUES ('p1', 'nobody', 'hello')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn deleting_post_cascades_interactions_and_nft() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, auth_id, username) VALUES ('u1', 'ext-1', 'alice');
             INSERT INTO posts (id, author_id, content) VALUES ('p1', 'u1', 'hi');
             INSERT INTO comments (id, post_id, author_id, content) VALUES ('c1', 'p1', 'u1', 'yo');
             INSERT INTO likes (id, user_id, post_id) VALUES ('l1', 'u1', 'p1');
             INSERT INTO nfts (id, post_id, token_id, contract_address, owner_id)
                 VALUES ('n1', 'p1', '7', '0xabc', 'u1');
             INSERT INTO bids (id, nft_id, bidder_id, amount) VALUES ('b1', 'n1', 'u1', '1.5');",
        )
        .unwrap();

        conn.execute("DELETE FROM posts WHERE id = 'p1'", [])
            .unwrap();

        for table in ["comments", "likes", "nfts", "bids"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert_eq!(count, 0, "{} should be empty after cascade", table);
        }
    }
}
