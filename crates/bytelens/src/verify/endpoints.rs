//! Ordered endpoint fallback.
//!
//! Each attempt is bounded by the request timeout. Any failure (transport,
//! status, timeout, RPC error) moves on to the next endpoint; running out of
//! endpoints returns the last error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{EngineConfig, Endpoint};
use crate::rpc::{AccountInfo, RpcError, RpcRequest, RpcResponse, RpcTransport};

#[derive(Clone)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
    timeout: Duration,
    transport: Arc<dyn RpcTransport>,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<Endpoint>, timeout: Duration, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            endpoints,
            timeout,
            transport,
        }
    }

    pub fn from_config(config: &EngineConfig, transport: Arc<dyn RpcTransport>) -> Self {
        Self::new(config.endpoints.clone(), config.request_timeout, transport)
    }

    /// `getAccountInfo` for one address.
    ///
    /// `Ok(None)` means the account does not exist.
    pub async fn get_account(&self, id: u64, address: &str) -> Result<Option<AccountInfo>, RpcError> {
        let request = RpcRequest::get_account_info(id, address);
        self.with_fallback(address, |endpoint| {
            let request = &request;
            async move {
                self.transport
                    .send(endpoint, request)
                    .await?
                    .into_lookup()
            }
        })
        .await
    }

    /// One combined request, falling back as a unit.
    pub async fn get_accounts_batch(
        &self,
        requests: &[RpcRequest],
    ) -> Result<Vec<RpcResponse>, RpcError> {
        let label = format!("batch of {}", requests.len());
        self.with_fallback(&label, |endpoint| async move {
            self.transport.send_batch(endpoint, requests).await
        })
        .await
    }

    async fn with_fallback<'a, T, F, Fut>(&'a self, what: &str, attempt: F) -> Result<T, RpcError>
    where
        F: Fn(&'a Endpoint) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let mut last_error = RpcError::NoEndpoints;

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            let outcome = match tokio::time::timeout(self.timeout, attempt(endpoint)).await {
                Ok(result) => result,
                Err(_) => Err(RpcError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(value) => {
                    debug!("{} resolved via endpoint {} ({})", what, index, endpoint.name());
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        "Endpoint {}/{} ({}) failed for {}: {}",
                        index + 1,
                        self.endpoints.len(),
                        endpoint.name(),
                        what,
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::{MockTransport, funded};

    fn pool(transport: Arc<MockTransport>, timeout: Duration) -> EndpointPool {
        EndpointPool::new(
            vec![Endpoint::new("https://a"), Endpoint::new("https://b")],
            timeout,
            transport,
        )
    }

    #[tokio::test]
    async fn test_falls_back_to_next_endpoint() {
        let transport = Arc::new(
            MockTransport::new()
                .failing_endpoint("https://a", RpcError::Http { status: 429 })
                .with_account("Key1", funded(10)),
        );
        let pool = pool(transport.clone(), Duration::from_secs(1));

        let info = pool.get_account(1, "Key1").await.unwrap().unwrap();
        assert_eq!(info.lamports, 10);

        let endpoints: Vec<String> = transport.calls().into_iter().map(|c| c.endpoint).collect();
        assert_eq!(endpoints, vec!["https://a", "https://b"]);
    }

    #[tokio::test]
    async fn test_exhausted_endpoints_return_last_error() {
        let transport = Arc::new(
            MockTransport::new()
                .failing_endpoint("https://a", RpcError::Http { status: 500 })
                .failing_endpoint("https://b", RpcError::Http { status: 503 }),
        );
        let pool = pool(transport.clone(), Duration::from_secs(1));

        let err = pool.get_account(1, "Key1").await.unwrap_err();
        assert_eq!(err, RpcError::Http { status: 503 });
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let transport = Arc::new(
            MockTransport::new()
                .hanging_endpoint("https://a")
                .with_account("Key1", funded(5)),
        );
        let pool = pool(transport, Duration::from_millis(20));

        let info = pool.get_account(1, "Key1").await.unwrap();
        assert_eq!(info.map(|i| i.lamports), Some(5));
    }

    #[tokio::test]
    async fn test_no_endpoints() {
        let pool = EndpointPool::new(vec![], Duration::from_secs(1), Arc::new(MockTransport::new()));
        assert_eq!(
            pool.get_account(1, "Key1").await.unwrap_err(),
            RpcError::NoEndpoints
        );
    }
}
