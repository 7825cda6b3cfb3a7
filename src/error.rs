//! Bridge-level error taxonomy shared across the resolver, flow driver, and pipeline.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
///
/// Every authentication-side variant carries a human-readable `detail` string and maps to one
/// [`FailureClassification`]; callers therefore always receive either a snapshot or one precise
/// classification, never a raw transport exception.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller supplied an empty identifier or secret; detected before any network access.
	#[error("Credentials are incomplete: {detail}.")]
	MissingCredentials {
		/// Human-readable failure detail.
		detail: String,
	},
	/// No configured strategy could even reach a login form.
	#[error("No matching identity provider: {detail}.")]
	NoMatchingProvider {
		/// Human-readable failure detail.
		detail: String,
	},
	/// Credentials reached an identity provider and were refused.
	#[error("The identity provider rejected the credentials: {detail}.")]
	LoginRejected {
		/// Human-readable failure detail.
		detail: String,
	},
	/// Login succeeded at the provider but the return trip never landed on the portal.
	#[error("The callback to the portal was never reached: {detail}.")]
	CallbackNotReached {
		/// Human-readable failure detail.
		detail: String,
	},
	/// Transport-level failure on any hop, timeouts included.
	#[error("Network error: {detail}.")]
	Network {
		/// Human-readable failure detail.
		detail: String,
		/// Transport-specific failure, when one is available.
		#[source]
		source: Option<BoxError>,
	},
	/// Authenticated, but the page shape was unrecognized by every extractor.
	#[error("Extraction produced no data: {detail}.")]
	ExtractionEmpty {
		/// Human-readable failure detail.
		detail: String,
	},

	/// Local configuration or caller-input problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Wraps a transport-specific network failure with a detail string.
	pub fn network(detail: impl Into<String>, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { detail: detail.into(), source: Some(Box::new(src)) }
	}

	/// Returns the terminal [`FailureClassification`] for this error, if one applies.
	///
	/// [`Error::Config`] has no classification; it never leaves the caller's machine.
	pub fn classification(&self) -> Option<FailureClassification> {
		match self {
			Self::MissingCredentials { .. } => Some(FailureClassification::MissingCredentials),
			Self::NoMatchingProvider { .. } => Some(FailureClassification::NoMatchingProvider),
			Self::LoginRejected { .. } => Some(FailureClassification::LoginRejected),
			Self::CallbackNotReached { .. } => Some(FailureClassification::CallbackNotReached),
			Self::Network { .. } => Some(FailureClassification::NetworkError),
			Self::ExtractionEmpty { .. } => Some(FailureClassification::ExtractionEmpty),
			Self::Config(_) => None,
		}
	}

	/// Maps this error onto the `/sync` HTTP contract.
	///
	/// Malformed or missing caller input is `400`, resolver classifications are `401`, and
	/// anything else is `500`.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::Config(_) | Self::MissingCredentials { .. } => 400,
			Self::NoMatchingProvider { .. }
			| Self::LoginRejected { .. }
			| Self::CallbackNotReached { .. }
			| Self::Network { .. } => 401,
			Self::ExtractionEmpty { .. } => 500,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		let detail = if e.is_timeout() {
			"request timed out".into()
		} else if e.is_connect() {
			"connection could not be established".into()
		} else {
			format!("transport failure{}", e.url().map(|url| format!(" for {url}")).unwrap_or_default())
		};

		Self::network(detail, e)
	}
}

/// Terminal failure classifications created once at the point of failure and never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClassification {
	/// Caller error; fail fast without network access.
	MissingCredentials,
	/// No configured strategy could even reach a login form.
	NoMatchingProvider,
	/// Credentials reached a provider and were refused.
	LoginRejected,
	/// Login succeeded at the provider but the portal was never reached again.
	CallbackNotReached,
	/// Transport-level failure on any hop.
	NetworkError,
	/// Authenticated but no extractor recognized the page shape.
	ExtractionEmpty,
}
impl FailureClassification {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureClassification::MissingCredentials => "missing_credentials",
			FailureClassification::NoMatchingProvider => "no_matching_provider",
			FailureClassification::LoginRejected => "login_rejected",
			FailureClassification::CallbackNotReached => "callback_not_reached",
			FailureClassification::NetworkError => "network_error",
			FailureClassification::ExtractionEmpty => "extraction_empty",
		}
	}
}
impl Display for FailureClassification {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and caller-input failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Endpoint URL could not be parsed.
	#[error("Endpoint URL is invalid: {url}.")]
	InvalidEndpoint {
		/// Raw endpoint value supplied by the caller.
		url: String,
		/// Underlying parsing failure, when one exists.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Endpoint URL uses a scheme other than HTTP or HTTPS.
	#[error("Endpoint URL must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// Raw endpoint value supplied by the caller.
		url: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Sync request body is not valid JSON for the expected shape.
	#[error("Sync request body is malformed.")]
	MalformedRequest {
		/// Structured parsing failure carrying the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Identity provider profile failed validation.
	#[error(transparent)]
	Profile(#[from] crate::provider::ProfileError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
