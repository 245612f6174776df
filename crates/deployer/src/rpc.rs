//! Blocking JSON-RPC `eth_call` transport

use alloy_primitives::{Address, Bytes};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use ethbtc_core::{FeedError, FeedResult};
use ethbtc_price_feed::CallTransport;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Bytes>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `eth_call` over HTTP against the latest block
pub struct JsonRpcTransport {
    url: String,
    client: reqwest::blocking::Client,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CallTransport for JsonRpcTransport {
    fn call(&self, to: Address, data: Bytes) -> FeedResult<Bytes> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"]
        });

        debug!("eth_call #{} to {}", id, to);

        let body = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::Transport(e.to_string()))?
            .text()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        parse_response(&body)
    }
}

/// Extract the call output from a JSON-RPC response body
fn parse_response(body: &str) -> FeedResult<Bytes> {
    let response: RpcResponse =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(FeedError::Transport(format!(
            "RPC error {}: {}",
            error.code, error.message
        )));
    }

    response
        .result
        .ok_or_else(|| FeedError::Decode("response has neither result nor error".to_string()))
}
