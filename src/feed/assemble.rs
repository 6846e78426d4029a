use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::DbPool;

/// The author/owner/bidder projection embedded throughout the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    pub image: String,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedComment {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedBid {
    pub id: String,
    pub amount: String,
    pub status: String,
    pub created_at: String,
    pub bidder: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedNft {
    pub id: String,
    pub token_id: String,
    pub contract_address: String,
    pub price: String,
    pub for_sale: bool,
    pub chain: String,
    pub owner: UserSummary,
    pub bids: Vec<FeedBid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCounts {
    pub likes: i64,
    pub comments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: String,
    pub content: String,
    pub image: String,
    pub created_at: String,
    pub author: UserSummary,
    /// Comments in ascending creation order.
    pub comments: Vec<FeedComment>,
    /// Ids of the users who liked this post.
    pub likes: Vec<String>,
    #[serde(rename = "_count")]
    pub count: FeedCounts,
    pub nft: Option<FeedNft>,
}

impl FeedPost {
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Assemble one feed page, newest posts first.
///
/// Relations are loaded with explicit per-post queries rather than one wide
/// join; the page size bounds the query fan-out.
pub fn get_posts(pool: &DbPool, page: u32, page_size: u32) -> AppResult<Vec<FeedPost>> {
    let conn = pool.get()?;
    let limit = i64::from(page_size.max(1));
    let offset = i64::from(page) * limit;

    let mut stmt = conn.prepare(
        "SELECT p.id, p.content, p.image, p.created_at,
                u.id, u.name, u.username, u.image, u.wallet_address
         FROM posts p
         JOIN users u ON u.id = p.author_id
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?1 OFFSET ?2",
    )?;

    let skeletons: Vec<(String, String, String, String, UserSummary)> = stmt
        .query_map(params![limit, offset], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                summary_from_row(row, 4)?,
            ))
        })?
        .collect::<Result<_, _>>()?;

    let mut posts = Vec::with_capacity(skeletons.len());
    for (id, content, image, created_at, author) in skeletons {
        let comments = load_comments(&conn, &id)?;
        let likes = load_likes(&conn, &id)?;
        let nft = load_nft(&conn, &id)?;
        let count = FeedCounts {
            likes: likes.len() as i64,
            comments: comments.len() as i64,
        };
        posts.push(FeedPost {
            id,
            content,
            image,
            created_at,
            author,
            comments,
            likes,
            count,
            nft,
        });
    }

    Ok(posts)
}

fn load_comments(conn: &Connection, post_id: &str) -> AppResult<Vec<FeedComment>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.content, c.created_at,
                u.id, u.name, u.username, u.image, u.wallet_address
         FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE c.post_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let comments = stmt
        .query_map(params![post_id], |row| {
            Ok(FeedComment {
                id: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
                author: summary_from_row(row, 3)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    Ok(comments)
}

fn load_likes(conn: &Connection, post_id: &str) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT user_id FROM likes WHERE post_id = ?1")?;
    let likes = stmt
        .query_map(params![post_id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(likes)
}

fn load_nft(conn: &Connection, post_id: &str) -> AppResult<Option<FeedNft>> {
    let nft = conn
        .query_row(
            "SELECT n.id, n.token_id, n.contract_address, n.price, n.for_sale, n.chain,
                    u.id, u.name, u.username, u.image, u.wallet_address
             FROM nfts n
             JOIN users u ON u.id = n.owner_id
             WHERE n.post_id = ?1",
            params![post_id],
            |row| {
                Ok(FeedNft {
                    id: row.get(0)?,
                    token_id: row.get(1)?,
                    contract_address: row.get(2)?,
                    price: row.get(3)?,
                    for_sale: row.get(4)?,
                    chain: row.get(5)?,
                    owner: summary_from_row(row, 6)?,
                    bids: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut nft) = nft else {
        return Ok(None);
    };

    // Highest bid first; amounts are decimal strings compared numerically.
    let mut stmt = conn.prepare(
        "SELECT b.id, b.amount, b.status, b.created_at,
                u.id, u.name, u.username, u.image, u.wallet_address
         FROM bids b
         JOIN users u ON u.id = b.bidder_id
         WHERE b.nft_id = ?1
         ORDER BY CAST(b.amount AS REAL) DESC, b.created_at ASC",
    )?;

    nft.bids = stmt
        .query_map(params![nft.id], |row| {
            Ok(FeedBid {
                id: row.get(0)?,
                amount: row.get(1)?,
                status: row.get(2)?,
                created_at: row.get(3)?,
                bidder: summary_from_row(row, 4)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    Ok(Some(nft))
}

fn summary_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        username: row.get(offset + 2)?,
        image: row.get(offset + 3)?,
        wallet_address: row.get(offset + 4)?,
    })
}
