pub mod agent;
pub mod auth;
pub mod feed;
pub mod nft;
pub mod wallet;
