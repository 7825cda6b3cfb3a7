//! Per-invocation session primitives: credentials, the normalized portal endpoint, and the
//! authenticated session handed to the extraction pipeline.

// self
use crate::{_prelude::*, error::ConfigError};
#[cfg(feature = "reqwest")]
use crate::http::{FetchedPage, Navigator};

/// Path of the portal's student entry resource, appended to every normalized endpoint.
pub const ENTRY_RESOURCE: &str = "eleve.html";

/// Opaque credential pair supplied by the caller.
///
/// The secret never appears in logs: `Debug` redacts it, and no flow or extractor ever embeds it
/// in a detail string. Values live exactly as long as one `sync` invocation.
#[derive(Clone)]
pub struct Credentials {
	identifier: String,
	secret: String,
}
impl Credentials {
	/// Creates a credential pair from caller-supplied strings, trimming surrounding whitespace.
	pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into().trim().to_owned(),
			secret: secret.into().trim().to_owned(),
		}
	}

	/// Returns the login identifier.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Returns the secret for form submission.
	pub fn secret(&self) -> &str {
		&self.secret
	}

	/// Checks that both fields are non-empty, the precondition for any network access.
	pub fn is_complete(&self) -> bool {
		!self.identifier.is_empty() && !self.secret.is_empty()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("identifier", &self.identifier)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Normalized base URL of the target portal.
///
/// The base always ends in a path separator, and any pre-existing [`ENTRY_RESOURCE`] suffix in
/// the caller's input (query string included) is stripped before the entry resource is
/// re-appended, so the entry URL never carries duplicated path segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
	base: Url,
	entry: Url,
}
impl Endpoint {
	/// Normalizes and validates a caller-supplied portal URL.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let trimmed = raw.trim();
		let stripped = match trimmed.find(ENTRY_RESOURCE) {
			Some(idx) => &trimmed[..idx],
			None => trimmed,
		};
		let mut normalized = stripped.to_owned();

		if !normalized.ends_with('/') {
			normalized.push('/');
		}

		let base = Url::parse(&normalized)
			.map_err(|source| ConfigError::InvalidEndpoint { url: raw.into(), source: Some(source) })?;

		if !matches!(base.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: raw.into() });
		}
		if base.host_str().is_none() {
			return Err(ConfigError::InvalidEndpoint { url: raw.into(), source: None });
		}

		let entry = base
			.join(ENTRY_RESOURCE)
			.map_err(|source| ConfigError::InvalidEndpoint { url: raw.into(), source: Some(source) })?;

		Ok(Self { base, entry })
	}

	/// Returns the normalized base URL.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Returns the full URL of the portal's entry resource.
	pub fn entry_url(&self) -> &Url {
		&self.entry
	}

	/// Returns the portal's `host[:port]` authority used for arrival checks.
	pub fn authority(&self) -> String {
		url_authority(&self.base)
	}

	/// Checks whether `url` points at the portal's authority.
	pub fn matches(&self, url: &Url) -> bool {
		url_authority(url).eq_ignore_ascii_case(&self.authority())
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.base.as_str())
	}
}
impl FromStr for Endpoint {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// Renders the `host[:port]` authority of a URL; the default port is omitted just as reqwest
/// omits it from final URLs, so authorities compare consistently across hops.
pub fn url_authority(url: &Url) -> String {
	let host = url.host_str().unwrap_or_default();

	match url.port() {
		Some(port) => format!("{host}:{port}"),
		None => host.to_owned(),
	}
}

/// Opaque holder of one invocation's cookie state plus the final page reached.
///
/// The session is produced by exactly one strategy, owns its navigator (and thus its cookie jar)
/// exclusively, and is handed to the extraction pipeline by reference. Nothing is shared across
/// concurrent invocations.
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct AuthSession {
	navigator: Navigator,
	page: FetchedPage,
	strategy: String,
}
#[cfg(feature = "reqwest")]
impl AuthSession {
	/// Binds a navigator and the final page it reached to the strategy that produced them.
	pub fn new(navigator: Navigator, page: FetchedPage, strategy: impl Into<String>) -> Self {
		Self { navigator, page, strategy: strategy.into() }
	}

	/// Returns the navigator carrying the authenticated cookie jar.
	pub fn navigator(&self) -> &Navigator {
		&self.navigator
	}

	/// Returns the final authenticated page.
	pub fn page(&self) -> &FetchedPage {
		&self.page
	}

	/// Returns the label of the strategy that produced the session.
	pub fn strategy(&self) -> &str {
		&self.strategy
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_appends_missing_separator() {
		let endpoint =
			Endpoint::parse("https://school.example/portal").expect("Endpoint should parse.");

		assert_eq!(endpoint.base().as_str(), "https://school.example/portal/");
		assert_eq!(endpoint.entry_url().as_str(), "https://school.example/portal/eleve.html");
	}

	#[test]
	fn endpoint_strips_preexisting_entry_suffix() {
		for raw in [
			"https://school.example/portal/eleve.html",
			"https://school.example/portal/eleve.html?login=true",
			" https://school.example/portal/eleve.html ",
		] {
			let endpoint = Endpoint::parse(raw).expect("Endpoint should parse.");

			assert_eq!(
				endpoint.entry_url().as_str(),
				"https://school.example/portal/eleve.html",
				"Suffix must not duplicate for {raw:?}.",
			);
		}
	}

	#[test]
	fn endpoint_rejects_garbage_and_bad_schemes() {
		assert!(matches!(
			Endpoint::parse("not a url"),
			Err(ConfigError::InvalidEndpoint { .. })
		));
		assert!(matches!(
			Endpoint::parse("ftp://school.example/portal/"),
			Err(ConfigError::UnsupportedScheme { .. })
		));
	}

	#[test]
	fn authority_includes_non_default_ports() {
		let endpoint =
			Endpoint::parse("http://127.0.0.1:5123/portal/").expect("Endpoint should parse.");
		let elsewhere = Url::parse("http://127.0.0.1:5999/portal/eleve.html")
			.expect("Comparison URL should parse.");

		assert_eq!(endpoint.authority(), "127.0.0.1:5123");
		assert!(!endpoint.matches(&elsewhere));
	}

	#[test]
	fn credentials_redact_the_secret() {
		let credentials = Credentials::new("jane.doe", "hunter2");

		assert!(!format!("{credentials:?}").contains("hunter2"));
		assert!(credentials.is_complete());
		assert!(!Credentials::new("jane.doe", "   ").is_complete());
	}
}
