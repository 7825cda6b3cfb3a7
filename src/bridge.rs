//! Collaborator-facing bridge service: one `sync` operation composing authentication
//! resolution and snapshot extraction, plus the serde shapes of the `/sync` wire contract.
//!
//! Request routing itself stays outside the crate; a host server decodes the body with
//! [`SyncRequest::from_json`], invokes [`BridgeService::sync`], and maps the outcome through
//! [`Error::http_status`] and [`SyncFailure`].

// self
use crate::{_prelude::*, error::FailureClassification};
#[cfg(feature = "reqwest")]
use crate::{
	extract::{ExtractionContext, ExtractionPipeline},
	resolver::AuthResolver,
	session::{Credentials, Endpoint},
	snapshot::StudentSnapshot,
};

/// Body of the `POST /sync` operation.
///
/// The field aliases keep the original bridge's wire shape (`schoolUrl`/`username`/`password`)
/// decodable alongside the canonical names.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
	/// Institution portal URL; normalized into an [`Endpoint`] before use.
	#[serde(alias = "schoolUrl")]
	pub endpoint: String,
	/// Login identifier.
	#[serde(alias = "username")]
	pub identifier: String,
	/// Login secret; redacted from `Debug` output.
	#[serde(alias = "password")]
	pub secret: String,
}
impl SyncRequest {
	/// Decodes a JSON body, reporting the offending path on malformed input.
	pub fn from_json(body: &str) -> Result<Self, crate::error::ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| crate::error::ConfigError::MalformedRequest { source })
	}
}
impl Debug for SyncRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SyncRequest")
			.field("endpoint", &self.endpoint)
			.field("identifier", &self.identifier)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Serializable failure body paired with the HTTP status from [`Error::http_status`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
	/// Terminal classification, when the failure carries one.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub classification: Option<FailureClassification>,
	/// Human-readable failure detail.
	pub error: String,
}
impl From<&Error> for SyncFailure {
	fn from(error: &Error) -> Self {
		Self { classification: error.classification(), error: error.to_string() }
	}
}

/// Composes the resolver and the extraction pipeline behind one operation.
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct BridgeService {
	resolver: AuthResolver,
	pipeline: ExtractionPipeline,
}
#[cfg(feature = "reqwest")]
impl BridgeService {
	/// Creates a service over the built-in profile registry and the default pipeline.
	pub fn new() -> Self {
		Self { resolver: AuthResolver::builtin(), pipeline: ExtractionPipeline::default() }
	}

	/// Replaces the resolver, e.g. to register a structured-client adapter.
	pub fn with_resolver(mut self, resolver: AuthResolver) -> Self {
		self.resolver = resolver;

		self
	}

	/// Replaces the extraction pipeline.
	pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
		self.pipeline = pipeline;

		self
	}

	/// Authenticates against the portal and extracts a snapshot from the page reached.
	///
	/// Each invocation owns an independent session and cookie jar; concurrent invocations
	/// share nothing mutable. Resolver failures are terminal and surface as classified errors;
	/// extraction never fails and at worst returns a sentinel-filled snapshot flagged
	/// [`FailureClassification::ExtractionEmpty`].
	pub async fn sync(&self, request: &SyncRequest) -> Result<StudentSnapshot> {
		let endpoint = Endpoint::parse(&request.endpoint)?;
		let credentials = Credentials::new(&request.identifier, &request.secret);
		let session = self.resolver.resolve(&credentials, &endpoint).await?;
		let cx = ExtractionContext::new(credentials.identifier());

		Ok(self.pipeline.extract(&session, &cx))
	}
}
#[cfg(feature = "reqwest")]
impl Default for BridgeService {
	fn default() -> Self {
		Self::new()
	}
}
