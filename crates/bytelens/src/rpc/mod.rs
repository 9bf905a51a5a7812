//! JSON-RPC wire types and the transport capability.
//!
//! Only `getAccountInfo` is spoken. Request shape:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"getAccountInfo",
//!  "params":["<base58>",{"encoding":"base64"}]}
//! ```
//!
//! A missing `result.value` means the account does not exist.

mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod transport;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use error::{FailureCategory, RpcError, is_not_found_message};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use transport::RpcTransport;

pub const GET_ACCOUNT_INFO: &str = "getAccountInfo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn get_account_info(id: u64, address: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: GET_ACCOUNT_INFO.to_string(),
            params: json!([address, { "encoding": "base64" }]),
        }
    }

    /// The base58 address this request asks about.
    pub fn address(&self) -> Option<&str> {
        self.params.get(0).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AccountInfoResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfoResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default)]
    pub value: Option<WireAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccount {
    pub owner: String,
    pub lamports: u64,
    #[serde(default)]
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
    /// `[payload, encoding]`
    pub data: (String, String),
}

/// Live account metadata resolved from an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub owner: String,
    pub lamports: u64,
    pub executable: bool,
    pub rent_epoch: u64,
    #[serde(with = "data_base64", default)]
    pub data: Vec<u8>,
}

impl AccountInfo {
    pub fn exists(&self) -> bool {
        self.lamports > 0
    }
}

impl TryFrom<WireAccount> for AccountInfo {
    type Error = RpcError;

    fn try_from(wire: WireAccount) -> Result<Self, Self::Error> {
        let (payload, encoding) = wire.data;
        if encoding != "base64" {
            return Err(RpcError::Decode(format!(
                "unsupported data encoding '{}'",
                encoding
            )));
        }
        let data = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| RpcError::Decode(format!("account data: {}", e)))?;
        Ok(Self {
            owner: wire.owner,
            lamports: wire.lamports,
            executable: wire.executable,
            rent_epoch: wire.rent_epoch,
            data,
        })
    }
}

impl From<&AccountInfo> for WireAccount {
    fn from(info: &AccountInfo) -> Self {
        Self {
            owner: info.owner.clone(),
            lamports: info.lamports,
            executable: info.executable,
            rent_epoch: info.rent_epoch,
            data: (STANDARD.encode(&info.data), "base64".to_string()),
        }
    }
}

impl RpcResponse {
    pub fn found(id: u64, info: &AccountInfo) -> Self {
        Self {
            id: Some(id),
            result: Some(AccountInfoResult {
                context: None,
                value: Some(WireAccount::from(info)),
            }),
            error: None,
        }
    }

    pub fn missing(id: u64) -> Self {
        Self {
            id: Some(id),
            result: Some(AccountInfoResult {
                context: None,
                value: None,
            }),
            error: None,
        }
    }

    /// Classify a response.
    ///
    /// - `Ok(Some(_))`: account exists
    /// - `Ok(None)`: no value, or a "not found" style RPC error
    /// - `Err(_)`: any other RPC error or undecodable payload
    pub fn into_lookup(self) -> Result<Option<AccountInfo>, RpcError> {
        if let Some(error) = self.error {
            if is_not_found_message(&error.message) {
                return Ok(None);
            }
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        match self.result.and_then(|r| r.value) {
            Some(wire) => AccountInfo::try_from(wire).map(Some),
            None => Ok(None),
        }
    }
}

mod data_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
