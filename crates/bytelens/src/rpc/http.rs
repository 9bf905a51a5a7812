use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{RpcError, RpcRequest, RpcResponse, RpcTransport};
use crate::config::Endpoint;

/// `reqwest`-backed transport posting JSON bodies.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, RpcError> {
        let user_agent = format!(
            "bytelens/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    async fn post<B, T>(&self, endpoint: &Endpoint, body: &B) -> Result<T, RpcError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {}", endpoint.name());
        let response = self
            .client
            .post(&endpoint.url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let response = check_status(response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))
    }

    fn map_error(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout(self.timeout)
        } else if let Some(status) = e.status() {
            RpcError::Http {
                status: status.as_u16(),
            }
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

fn check_status(response: Response) -> Result<Response, RpcError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RpcError::Http {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        request: &RpcRequest,
    ) -> Result<RpcResponse, RpcError> {
        self.post(endpoint, request).await
    }

    async fn send_batch(
        &self,
        endpoint: &Endpoint,
        requests: &[RpcRequest],
    ) -> Result<Vec<RpcResponse>, RpcError> {
        self.post(endpoint, requests).await
    }
}
