//! Scripted transport for tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AccountInfo, RpcError, RpcErrorObject, RpcRequest, RpcResponse, RpcTransport};
use crate::config::Endpoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub endpoint: String,
    pub addresses: Vec<String>,
    pub batched: bool,
}

#[derive(Default)]
pub struct MockTransport {
    accounts: HashMap<String, AccountInfo>,
    not_found_errors: HashSet<String>,
    rpc_errors: HashMap<String, RpcErrorObject>,
    missing_ids: HashSet<String>,
    failing: HashMap<String, RpcError>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, address: &str, info: AccountInfo) -> Self {
        self.accounts.insert(address.to_string(), info);
        self
    }

    /// Respond with an explicit "not found" error object for this address.
    pub fn with_not_found_error(mut self, address: &str) -> Self {
        self.not_found_errors.insert(address.to_string());
        self
    }

    /// Respond with an RPC error object for this address.
    pub fn with_rpc_error(mut self, address: &str, code: i64, message: &str) -> Self {
        self.rpc_errors.insert(
            address.to_string(),
            RpcErrorObject {
                code,
                message: message.to_string(),
            },
        );
        self
    }

    /// Answer this address without an id, so it cannot be matched in a batch.
    pub fn without_id(mut self, address: &str) -> Self {
        self.missing_ids.insert(address.to_string());
        self
    }

    pub fn failing_endpoint(mut self, url: &str, error: RpcError) -> Self {
        self.failing.insert(url.to_string(), error);
        self
    }

    /// Never answer (until the caller's timeout fires).
    pub fn hanging_endpoint(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn respond(&self, request: &RpcRequest) -> RpcResponse {
        let mut response = self.lookup(request);
        if self.missing_ids.contains(request.address().unwrap_or_default()) {
            response.id = None;
        }
        response
    }

    fn lookup(&self, request: &RpcRequest) -> RpcResponse {
        let address = request.address().unwrap_or_default();
        if let Some(error) = self.rpc_errors.get(address) {
            return RpcResponse {
                id: Some(request.id),
                result: None,
                error: Some(error.clone()),
            };
        }
        if self.not_found_errors.contains(address) {
            return RpcResponse {
                id: Some(request.id),
                result: None,
                error: Some(RpcErrorObject {
                    code: -32004,
                    message: "Account not found".to_string(),
                }),
            };
        }
        match self.accounts.get(address) {
            Some(info) => RpcResponse::found(request.id, info),
            None => RpcResponse::missing(request.id),
        }
    }

    async fn gate(&self, endpoint: &Endpoint) -> Result<(), RpcError> {
        if self.hanging.contains(&endpoint.url) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        match self.failing.get(&endpoint.url) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub fn funded(lamports: u64) -> AccountInfo {
    AccountInfo {
        owner: "11111111111111111111111111111111".to_string(),
        lamports,
        executable: false,
        rent_epoch: 0,
        data: vec![1, 2, 3, 4],
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        request: &RpcRequest,
    ) -> Result<RpcResponse, RpcError> {
        self.calls.lock().push(MockCall {
            endpoint: endpoint.url.clone(),
            addresses: vec![request.address().unwrap_or_default().to_string()],
            batched: false,
        });
        self.gate(endpoint).await?;
        Ok(self.respond(request))
    }

    async fn send_batch(
        &self,
        endpoint: &Endpoint,
        requests: &[RpcRequest],
    ) -> Result<Vec<RpcResponse>, RpcError> {
        self.calls.lock().push(MockCall {
            endpoint: endpoint.url.clone(),
            addresses: requests
                .iter()
                .map(|r| r.address().unwrap_or_default().to_string())
                .collect(),
            batched: true,
        });
        self.gate(endpoint).await?;
        // Reverse to prove callers match responses by id
        Ok(requests.iter().rev().map(|r| self.respond(r)).collect())
    }
}
