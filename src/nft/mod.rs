pub mod pinning;

use rusqlite::{params, OptionalExtension};
use serde::Deserialize;

use crate::db::models::{Bid, Nft};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintParams {
    pub token_id: String,
    pub contract_address: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub for_sale: bool,
}

/// Record a minted token against a post. One NFT per post; the owner must be
/// an existing user (FK enforced).
pub fn record_mint(
    pool: &DbPool,
    post_id: &str,
    owner_id: &str,
    params: &MintParams,
) -> AppResult<Nft> {
    if params.token_id.is_empty() || params.contract_address.is_empty() {
        return Err(AppError::BadRequest(
            "tokenId and contractAddress are required".into(),
        ));
    }

    let conn = pool.get()?;

    let post_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if !post_exists {
        return Err(AppError::NotFound);
    }

    let already_minted: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM nfts WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if already_minted {
        return Err(AppError::Conflict("post is already minted".into()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let price = if params.price.is_empty() {
        "0"
    } else {
        params.price.as_str()
    };
    conn.execute(
        "INSERT INTO nfts (id, post_id, token_id, contract_address, owner_id, price, for_sale, chain)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            post_id,
            params.token_id,
            params.contract_address,
            owner_id,
            price,
            params.for_sale,
            params.chain,
        ],
    )?;

    tracing::info!(post_id = %post_id, token_id = %params.token_id, "Recorded mint");
    load_nft(&conn, &id)?.ok_or_else(|| AppError::Internal("nft row missing after insert".into()))
}

/// Append a bid to an NFT's sub-ledger. Bids start out pending; acceptance
/// and ownership transfer are out of scope.
pub fn place_bid(pool: &DbPool, nft_id: &str, bidder_id: &str, amount: &str) -> AppResult<Bid> {
    // Reject NaN/inf too: CAST('NaN' AS REAL) is 0.0 in SQLite, which would
    // scramble the bids-by-amount ordering.
    let valid = amount
        .parse::<f64>()
        .map_or(false, |a| a.is_finite() && a > 0.0);
    if !valid {
        return Err(AppError::BadRequest("amount must be a positive number".into()));
    }

    let conn = pool.get()?;

    let nft_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM nfts WHERE id = ?1",
        params![nft_id],
        |row| row.get(0),
    )?;
    if !nft_exists {
        return Err(AppError::NotFound);
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO bids (id, nft_id, bidder_id, amount) VALUES (?1, ?2, ?3, ?4)",
        params![id, nft_id, bidder_id, amount],
    )?;

    conn.query_row(
        "SELECT id, nft_id, bidder_id, amount, status, created_at FROM bids WHERE id = ?1",
        params![id],
        |row| {
            Ok(Bid {
                id: row.get(0)?,
                nft_id: row.get(1)?,
                bidder_id: row.get(2)?,
                amount: row.get(3)?,
                status: row.get(4)?,
                created_at: row.get(5)?,
            })
        },
    )
    .map_err(AppError::from)
}

/// Owner-only: flip the for_sale flag and optionally reprice.
pub fn set_for_sale(
    pool: &DbPool,
    nft_id: &str,
    owner_id: &str,
    for_sale: bool,
    price: Option<&str>,
) -> AppResult<Nft> {
    let conn = pool.get()?;

    let current_owner: String = conn
        .query_row(
            "SELECT owner_id FROM nfts WHERE id = ?1",
            params![nft_id],
            |row| row.get(0),
        )
        .map_err(|_| AppError::NotFound)?;

    if current_owner != owner_id {
        return Err(AppError::Forbidden);
    }

    match price {
        Some(p) => conn.execute(
            "UPDATE nfts SET for_sale = ?1, price = ?2 WHERE id = ?3",
            params![for_sale, p, nft_id],
        )?,
        None => conn.execute(
            "UPDATE nfts SET for_sale = ?1 WHERE id = ?2",
            params![for_sale, nft_id],
        )?,
    };

    load_nft(&conn, nft_id)?.ok_or(AppError::NotFound)
}

fn load_nft(conn: &rusqlite::Connection, id: &str) -> AppResult<Option<Nft>> {
    conn.query_row(
        "SELECT id, post_id, token_id, contract_address, owner_id, price, for_sale, chain, created_at
         FROM nfts WHERE id = ?1",
        params![id],
        |row| {
            Ok(Nft {
                id: row.get(0)?,
                post_id: row.get(1)?,
                token_id: row.get(2)?,
                contract_address: row.get(3)?,
                owner_id: row.get(4)?,
                price: row.get(5)?,
                for_sale: row.get(6)?,
                chain: row.get(7)?,
                created_at: row.get(8)?,
            })
        },
    )
    .optional()
    .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::{sync_user, ExternalProfile};
    use crate::db;
    use crate::db::models::User;
    use crate::feed::posts::create_post;

    fn test_pool() -> DbPool {
        let pool = db::create_memory_pool().unwrap();
        db::run_migrations(&pool).unwrap();
        pool
    }

    fn seed_user(pool: &DbPool, auth_id: &str, username: &str) -> User {
        sync_user(
            pool,
            &ExternalProfile {
                auth_id: auth_id.to_string(),
                name: username.to_string(),
                username: Some(username.to_string()),
                email: format!("{}@example.com", username),
                image: String::new(),
                wallet_address: None,
            },
        )
        .unwrap()
    }

    fn mint_params() -> MintParams {
        MintParams {
            token_id: "7".to_string(),
            contract_address: "0xabc".to_string(),
            price: "1.5".to_string(),
            chain: "base-sepolia".to_string(),
            for_sale: false,
        }
    }

    #[test]
    fn record_mint_links_token_to_post() {
        let pool = test_pool();
        let user = seed_user(&pool, "ext-1", "alice");
        let post = create_post(&pool, &user.id, "minted", "").unwrap();

        let nft = record_mint(&pool, &post.id, &user.id, &mint_params()).unwrap();
        assert_eq!(nft.post_id, post.id);
        assert_eq!(nft.token_id, "7");
        assert_eq!(nft.owner_id, user.id);
        assert!(!nft.for_sale);
    }

    #[test]
    fn second_mint_on_same_post_is_conflict() {
        let pool = test_pool();
        let user = seed_user(&pool, "ext-1", "alice");
        let post = create_post(&pool, &user.id, "minted", "").unwrap();

        record_mint(&pool, &post.id, &user.id, &mint_params()).unwrap();
        let err = record_mint(&pool, &post.id, &user.id, &mint_params()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn mint_on_missing_post_is_not_found() {
        let pool = test_pool();
        let user = seed_user(&pool, "ext-1", "alice");
        let err = record_mint(&pool, "no-post", &user.id, &mint_params()).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn bid_requires_positive_amount() {
        let pool = test_pool();
        let user = seed_user(&pool, "ext-1", "alice");
        let post = create_post(&pool, &user.id, "minted", "").unwrap();
        let nft = record_mint(&pool, &post.id, &user.id, &mint_params()).unwrap();

        for bad in ["", "0", "-1", "abc", "NaN", "inf", "-inf"] {
            let err = place_bid(&pool, &nft.id, &user.id, bad).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "amount {:?}", bad);
        }

        let bid = place_bid(&pool, &nft.id, &user.id, "2.5").unwrap();
        assert_eq!(bid.status, "pending");
    }

    #[test]
    fn set_for_sale_is_owner_only() {
        let pool = test_pool();
        let alice = seed_user(&pool, "ext-1", "alice");
        let bob = seed_user(&pool, "ext-2", "bob");
        let post = create_post(&pool, &alice.id, "minted", "").unwrap();
        let nft = record_mint(&pool, &post.id, &alice.id, &mint_params()).unwrap();

        let err = set_for_sale(&pool, &nft.id, &bob.id, true, None).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let updated = set_for_sale(&pool, &nft.id, &alice.id, true, Some("3.0")).unwrap();
        assert!(updated.for_sale);
        assert_eq!(updated.price, "3.0");
    }
}
