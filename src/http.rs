//! Transport primitives for driving browser-like navigation.
//!
//! The module exposes [`Navigator`], a thin wrapper over [`ReqwestClient`] that owns one cookie
//! jar per invocation, follows redirects transparently, and records the final URL reached after
//! every hop. SSO flows are stateful per cookie jar, so every resolver candidate provisions its
//! own navigator; nothing here is shared between invocations.

// std
use std::time::Duration;
// crates.io
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);
const REDIRECT_LIMIT: usize = 10;
const USER_AGENT: &str = concat!("pronote-bridge/", env!("CARGO_PKG_VERSION"));

/// Configuration applied to every navigator the bridge provisions.
#[derive(Clone, Debug)]
pub struct NavigatorConfig {
	/// Per-call timeout bounding each HTTP round trip.
	pub timeout: Duration,
	/// Accepts invalid TLS certificates; only the test prelude enables this.
	pub accept_invalid_certs: bool,
}
impl NavigatorConfig {
	/// Overrides the per-call timeout (defaults to 25 seconds).
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Disables TLS certificate verification for mock servers with self-signed certificates.
	pub fn accept_invalid_certs(mut self) -> Self {
		self.accept_invalid_certs = true;

		self
	}
}
impl Default for NavigatorConfig {
	fn default() -> Self {
		Self { timeout: DEFAULT_TIMEOUT, accept_invalid_certs: false }
	}
}

/// Final state of one navigation: the URL actually reached after redirects, the status code,
/// and the decoded body text.
#[derive(Clone, Debug)]
pub struct FetchedPage {
	/// URL reached after every redirect was followed.
	pub url: Url,
	/// HTTP status code of the final response.
	pub status: u16,
	/// Decoded response body.
	pub body: String,
}

/// Browser-like HTTP client owning one isolated cookie jar.
#[derive(Clone, Debug)]
pub struct Navigator {
	client: ReqwestClient,
}
impl Navigator {
	/// Provisions a fresh client with its own cookie store.
	pub fn new(config: &NavigatorConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder()
			.cookie_store(true)
			.redirect(Policy::limited(REDIRECT_LIMIT))
			.timeout(config.timeout)
			.user_agent(USER_AGENT);

		if config.accept_invalid_certs {
			builder = builder.danger_accept_invalid_certs(true);
		}

		let client = builder.build().map_err(ConfigError::http_client_build)?;

		Ok(Self { client })
	}

	/// Issues a GET, following redirects, and records the final URL reached.
	pub async fn get(&self, url: Url) -> Result<FetchedPage> {
		let response = self.client.get(url).send().await?;

		Self::finish(response).await
	}

	/// Submits a form via POST, following redirects, and records the final URL reached.
	pub async fn post_form(&self, url: Url, fields: &BTreeMap<String, String>) -> Result<FetchedPage> {
		let response = self.client.post(url).form(fields).send().await?;

		Self::finish(response).await
	}

	async fn finish(response: reqwest::Response) -> Result<FetchedPage> {
		let url = response.url().clone();
		let status = response.status().as_u16();
		let body = response.text().await?;

		Ok(FetchedPage { url, status, body })
	}
}
