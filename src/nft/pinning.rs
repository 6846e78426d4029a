use serde::{Deserialize, Serialize};

use crate::config::PinningConfig;
use crate::error::{AppError, AppResult};

/// Client for the content-addressed pinning service that stores NFT
/// metadata. The wire contract is the service's own; we only care about the
/// returned content hash.
#[derive(Clone)]
pub struct PinningClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    gateway: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Serialize)]
pub struct PinResult {
    pub hash: String,
    pub uri: String,
}

impl PinningClient {
    /// Returns None when no pinning endpoint is configured.
    pub fn from_config(config: &PinningConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            endpoint,
            token: config.token.clone().unwrap_or_default(),
            gateway: config.gateway.clone(),
        })
    }

    pub async fn pin_json(&self, metadata: &serde_json::Value) -> AppResult<PinResult> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.endpoint);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "Pinning service rejected upload");
            return Err(AppError::Internal(format!(
                "pinning service returned {}",
                status
            )));
        }

        let pinned: PinResponse = response.json().await?;
        let uri = format!("{}{}", self.gateway, pinned.ipfs_hash);
        Ok(PinResult {
            hash: pinned.ipfs_hash,
            uri,
        })
    }
}
