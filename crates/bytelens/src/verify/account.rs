use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use super::EndpointPool;
use crate::codec::base58;
use crate::error::{Error, Result};
use crate::rpc::AccountInfo;

/// Fetches a single account's raw data for loading into the engine.
pub struct AccountFetcher {
    pool: EndpointPool,
    next_id: AtomicU64,
}

impl AccountFetcher {
    pub fn new(pool: EndpointPool) -> Self {
        Self {
            pool,
            next_id: AtomicU64::new(1),
        }
    }

    /// Resolve `address` to its account.
    ///
    /// The address must decode to exactly 32 bytes; that check happens
    /// before any network call.
    pub async fn fetch(&self, address: &str) -> Result<AccountInfo> {
        let address = address.trim();
        base58::decode_address(address)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let info = self
            .pool
            .get_account(id, address)
            .await?
            .ok_or_else(|| Error::AccountNotFound(address.to_string()))?;

        info!(
            "Fetched account {}: {} bytes, {} lamports, owner {}",
            address,
            info.data.len(),
            info.lamports,
            info.owner
        );
        Ok(info)
    }
}
