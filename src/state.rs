use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::feed::cache::FeedCache;
use crate::nft::pinning::PinningClient;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub feed_cache: FeedCache,
    /// Present only when a pinning endpoint is configured.
    pub pinning: Option<PinningClient>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let pinning = PinningClient::from_config(&config.pinning);
        Self {
            db,
            config,
            feed_cache: FeedCache::new(),
            pinning,
        }
    }
}
