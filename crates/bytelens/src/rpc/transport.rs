use async_trait::async_trait;

use super::{RpcError, RpcRequest, RpcResponse};
use crate::config::Endpoint;

/// Send JSON-RPC requests to one endpoint.
///
/// Implementations report transport failures and non-success statuses as
/// `Err`; fallback across endpoints and timeouts are handled by the caller.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, endpoint: &Endpoint, request: &RpcRequest)
    -> Result<RpcResponse, RpcError>;

    /// One combined request; responses may come back in any order.
    async fn send_batch(
        &self,
        endpoint: &Endpoint,
        requests: &[RpcRequest],
    ) -> Result<Vec<RpcResponse>, RpcError>;
}
