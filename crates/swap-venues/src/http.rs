//! HTTP plumbing shared by venue clients.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use swap_types::{SwapError, VenueId};
use tracing::debug;

/// A failed venue request, before it is given operation-specific meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpFailure {
	/// The venue could not be reached.
	Transport(String),
	/// The venue answered with a non-success status.
	Status { status: u16, message: String },
	/// The venue answered with a body we could not interpret.
	Decode(String),
}

impl HttpFailure {
	fn is_server_side(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Status { status, .. } => *status == 429 || *status >= 500,
			Self::Decode(_) => false,
		}
	}

	fn message(&self) -> String {
		match self {
			Self::Transport(message) | Self::Decode(message) => message.clone(),
			Self::Status { status, message } => format!("HTTP {}: {}", status, message),
		}
	}

	/// Meaning when quoting: the venue is down, or it has no route.
	pub(crate) fn into_quote_error(self, venue: &VenueId) -> SwapError {
		if self.is_server_side() {
			SwapError::VenueUnreachable {
				venue: venue.clone(),
				message: self.message(),
			}
		} else {
			SwapError::QuoteUnavailable {
				venue: venue.clone(),
				message: self.message(),
			}
		}
	}

	/// Meaning when building: the venue is down, or it refused to build.
	pub(crate) fn into_build_error(self, venue: &VenueId) -> SwapError {
		match self {
			Self::Transport(message) => SwapError::VenueUnreachable {
				venue: venue.clone(),
				message,
			},
			other => SwapError::TransactionBuildFailed {
				venue: venue.clone(),
				message: other.message(),
			},
		}
	}

	/// Meaning for reference-data reads.
	pub(crate) fn into_read_error(self, venue: &VenueId) -> SwapError {
		SwapError::VenueUnreachable {
			venue: venue.clone(),
			message: self.message(),
		}
	}
}

/// Picks the human-readable part of a venue error body.
fn error_message(body: &str) -> String {
	match serde_json::from_str::<serde_json::Value>(body) {
		Ok(value) => ["description", "error", "message"]
			.iter()
			.find_map(|field| value.get(field).and_then(|v| v.as_str()))
			.map(str::to_string)
			.unwrap_or_else(|| body.to_string()),
		Err(_) => body.to_string(),
	}
}

/// JSON-over-HTTP client rooted at a venue base URL.
#[derive(Debug, Clone)]
pub(crate) struct VenueHttp {
	client: reqwest::Client,
	base_url: String,
	bearer: Option<String>,
}

impl VenueHttp {
	pub(crate) fn new(
		base_url: impl Into<String>,
		bearer: Option<String>,
		venue: &VenueId,
	) -> Result<Self, SwapError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| SwapError::Config(format!("HTTP client for {}: {}", venue, e)))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			bearer: bearer.filter(|key| !key.is_empty()),
		})
	}

	fn url(&self, path: &str) -> String {
		if path.is_empty() {
			self.base_url.clone()
		} else {
			format!("{}/{}", self.base_url, path.trim_start_matches('/'))
		}
	}

	fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		match &self.bearer {
			Some(key) => request.bearer_auth(key),
			None => request,
		}
	}

	pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, HttpFailure>
	where
		T: DeserializeOwned,
		Q: Serialize + ?Sized,
	{
		let url = self.url(path);
		debug!(url = %url, "GET");
		let request = self.authorize(self.client.get(&url).query(query));
		Self::read(request).await
	}

	/// GETs an absolute URL, outside the base path.
	pub(crate) async fn get_absolute<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpFailure> {
		debug!(url = %url, "GET");
		Self::read(self.client.get(url)).await
	}

	pub(crate) async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, HttpFailure>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		let url = self.url(path);
		debug!(url = %url, "POST");
		let request = self.authorize(self.client.post(&url).json(body));
		Self::read(request).await
	}

	async fn read<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, HttpFailure> {
		let response = request
			.send()
			.await
			.map_err(|e| HttpFailure::Transport(e.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| HttpFailure::Transport(e.to_string()))?;

		if !status.is_success() {
			return Err(HttpFailure::Status {
				status: status.as_u16(),
				message: error_message(&body),
			});
		}

		serde_json::from_str(&body).map_err(|e| HttpFailure::Decode(e.to_string()))
	}
}
