//! Minimal JSON-RPC 2.0 client over HTTP.

use crate::utils::RetryPolicy;
use crate::{Result, RpcError};
use backoff::backoff::Backoff;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: P,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[serde(default)]
	result: serde_json::Value,
	error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
	#[serde(default)]
	code: i64,
	#[serde(default)]
	message: String,
	#[serde(default)]
	cause: Option<ErrorCause>,
	#[serde(default)]
	data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorCause {
	name: String,
}

/// JSON-RPC client bound to one endpoint.
#[derive(Debug)]
pub struct JsonRpcClient {
	client: reqwest::Client,
	url: String,
	next_id: AtomicU64,
	retry: RetryPolicy,
}

impl JsonRpcClient {
	pub fn new(url: impl Into<String>) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url: url.into(),
			next_id: AtomicU64::new(1),
			retry: RetryPolicy::default(),
		})
	}

	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Sends one request without retrying.
	pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
	where
		P: Serialize,
		R: DeserializeOwned,
	{
		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			method,
			params,
		};

		let response = self
			.client
			.post(&self.url)
			.json(&request)
			.send()
			.await
			.map_err(|e| RpcError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(RpcError::Http {
				status: status.as_u16(),
				body,
			});
		}

		let response: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| RpcError::Decode(format!("{}: {}", method, e)))?;

		if let Some(error) = response.error {
			let message = match error.data {
				Some(serde_json::Value::String(data)) if !data.is_empty() => {
					format!("{} ({})", error.message, data)
				}
				_ => error.message,
			};
			return Err(RpcError::Rpc {
				code: error.code,
				message,
				cause: error.cause.map(|c| c.name),
			});
		}

		// A `null` result is valid for lookups such as receipts
		serde_json::from_value(response.result)
			.map_err(|e| RpcError::Decode(format!("{}: {}", method, e)))
	}

	/// Sends a read-only request, retrying transient failures with
	/// exponential backoff.
	pub async fn request_with_retry<P, R>(&self, method: &str, params: P) -> Result<R>
	where
		P: Serialize,
		R: DeserializeOwned,
	{
		let mut backoff = self.retry.backoff();
		let mut attempts = 0;

		loop {
			match self.request(method, &params).await {
				Ok(result) => return Ok(result),
				Err(e) if !e.is_transient() => return Err(e),
				Err(e) => {
					attempts += 1;
					if attempts > self.retry.max_retries {
						warn!(
							"RPC {} failed after {} attempts, giving up: {}",
							method, attempts, e
						);
						return Err(e);
					}

					match backoff.next_backoff() {
						Some(delay) => {
							debug!(
								"RPC {} failed, attempt {}/{}, retrying in {:?}: {}",
								method, attempts, self.retry.max_retries, delay, e
							);
							tokio::time::sleep(delay).await;
						}
						None => {
							warn!("RPC {} failed, backoff exhausted: {}", method, e);
							return Err(e);
						}
					}
				}
			}
		}
	}
}
