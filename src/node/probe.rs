//! Liveness Probes
//!
//! A probe asks a node for its current chain head. The JSON-RPC probe uses a
//! blocking reqwest client; the request timeout is owned by the client.

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use super::RpcEndpoint;
use crate::error::ForgeResult;
use crate::utils::{rpc_request, rpc_result_u64};

/// Why a liveness probe failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid reply: {0}")]
    InvalidReply(String),
}

/// Fetches the latest block height of a node
///
/// `Ok(None)` means the node answered but reported no height, which counts
/// as a failed attempt.
pub trait NodeProbe {
    fn latest_block(&self, endpoint: &RpcEndpoint) -> Result<Option<u64>, ProbeError>;
}

impl<P: NodeProbe + ?Sized> NodeProbe for &P {
    fn latest_block(&self, endpoint: &RpcEndpoint) -> Result<Option<u64>, ProbeError> {
        (**self).latest_block(endpoint)
    }
}

impl<P: NodeProbe + ?Sized> NodeProbe for Box<P> {
    fn latest_block(&self, endpoint: &RpcEndpoint) -> Result<Option<u64>, ProbeError> {
        (**self).latest_block(endpoint)
    }
}

/// `eth_blockNumber` over HTTP JSON-RPC
pub struct JsonRpcProbe {
    client: Client,
}

impl JsonRpcProbe {
    /// Create a probe whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> ForgeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(2)
            .tcp_nodelay(true)
            .user_agent(concat!("wallet-forge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl NodeProbe for JsonRpcProbe {
    fn latest_block(&self, endpoint: &RpcEndpoint) -> Result<Option<u64>, ProbeError> {
        let body = rpc_request("eth_blockNumber", Value::Array(Vec::new()), 1);

        let response = self
            .client
            .post(endpoint.url().clone())
            .json(&body)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpStatus(status.as_u16()));
        }

        let reply: Value = response
            .json()
            .map_err(|e| ProbeError::InvalidReply(e.to_string()))?;

        let has_error = reply.get("error").map_or(false, |e| !e.is_null());
        let has_result = reply.get("result").map_or(false, |r| !r.is_null());
        if !has_error && !has_result {
            return Ok(None);
        }

        rpc_result_u64(&reply)
            .map(Some)
            .map_err(|e| ProbeError::InvalidReply(e.message))
    }
}

fn map_transport_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else if e.is_connect() {
        ProbeError::Transport("connection failed".to_string())
    } else {
        ProbeError::Transport(e.to_string())
    }
}
