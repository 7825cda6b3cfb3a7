//! Declarative identity provider profiles.
//!
//! One profile describes one SSO dialect: how to recognize the provider's host, how its login
//! form names credential fields, where the callback value hides, and what a rejected login looks
//! like. Supporting a new institution means adding one profile record, not a new code path.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const PROFILE_ID_MAX_LEN: usize = 64;

/// Query parameter names tried, in order, when capturing the callback value.
pub const CALLBACK_PARAM_CANDIDATES: [&str; 4] = ["service", "callback", "url", "ret"];

/// Login-error markers recognized on every provider, lowercased.
pub const DEFAULT_ERROR_MARKERS: [&str; 6] = [
	"mot de passe incorrect",
	"identifiant ou mot de passe",
	"authentification a échoué",
	"authentication failed",
	"invalid credentials",
	"compte bloqué",
];

/// Error returned when profile identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProfileIdError {
	/// The identifier was empty.
	#[error("Profile identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Profile identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Profile identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Identifier for an identity provider profile.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);
impl ProfileId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ProfileIdError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(ProfileIdError::Empty);
		}
		if view.chars().any(char::is_whitespace) {
			return Err(ProfileIdError::ContainsWhitespace);
		}
		if view.len() > PROFILE_ID_MAX_LEN {
			return Err(ProfileIdError::TooLong { max: PROFILE_ID_MAX_LEN });
		}

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ProfileId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProfileId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ProfileId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ProfileId> for String {
	fn from(value: ProfileId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProfileId {
	type Error = ProfileIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(&value)
	}
}
impl Debug for ProfileId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Profile({})", self.0)
	}
}
impl Display for ProfileId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ProfileId {
	type Err = ProfileIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Matches a `host[:port]` authority against a provider's expected location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMatcher {
	/// Exact authority match, port included; used by tests and single-host deployments.
	Exact(String),
	/// Domain suffix match on the host part, e.g. `educonnect.education.gouv.fr`.
	Suffix(String),
	/// Substring match anywhere in the host part, for dialects spread over many regions.
	Contains(String),
}
impl HostMatcher {
	/// Checks the matcher against a `host[:port]` authority.
	pub fn matches(&self, authority: &str) -> bool {
		let host = authority.split(':').next().unwrap_or(authority);

		match self {
			Self::Exact(expected) => authority.eq_ignore_ascii_case(expected),
			Self::Suffix(suffix) => {
				let host = host.to_ascii_lowercase();
				let suffix = suffix.to_ascii_lowercase();

				host == suffix || host.ends_with(&format!(".{suffix}"))
			},
			Self::Contains(fragment) =>
				host.to_ascii_lowercase().contains(&fragment.to_ascii_lowercase()),
		}
	}
}

/// Errors raised while constructing or validating profiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProfileError {
	/// Every profile must declare how to recognize its provider host.
	#[error("Profile `{id}` is missing a host matcher.")]
	MissingHostMatcher {
		/// Identifier of the offending profile.
		id: String,
	},
	/// Matchers built from empty strings match everything, which is never intended.
	#[error("Profile `{id}` declares an empty host matcher pattern.")]
	EmptyMatcherPattern {
		/// Identifier of the offending profile.
		id: String,
	},
}

/// Immutable description of one SSO dialect, defined at process start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProviderProfile {
	/// Profile identifier.
	pub id: ProfileId,
	/// Recognizer for the provider's authority.
	pub host_matcher: HostMatcher,
	/// Provider-specific identifier field names, tried before the built-in list.
	pub login_field_candidates: Vec<String>,
	/// Provider-specific secret field names, tried when no password-typed input exists.
	pub password_field_candidates: Vec<String>,
	/// Provider-specific callback parameter names, tried before the built-in list.
	pub callback_param_candidates: Vec<String>,
	/// Provider-specific login-error markers, lowercased, checked after the defaults.
	pub error_markers: Vec<String>,
	/// Recognizer for a successful arrival; `None` means "the portal's own authority".
	pub success_matcher: Option<HostMatcher>,
}
impl IdentityProviderProfile {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProfileId) -> ProfileBuilder {
		ProfileBuilder::new(id)
	}

	/// Returns callback parameter names in resolution order: profile-specific first.
	pub fn callback_params(&self) -> impl Iterator<Item = &str> {
		self.callback_param_candidates
			.iter()
			.map(String::as_str)
			.chain(CALLBACK_PARAM_CANDIDATES)
	}

	/// Checks a page body for a login-error marker; case-insensitive.
	pub fn has_error_marker(&self, body: &str) -> bool {
		// French banners shout with accented uppercase ("A ÉCHOUÉ"), which ASCII folding misses.
		let lowered = body.to_lowercase();

		DEFAULT_ERROR_MARKERS
			.iter()
			.copied()
			.chain(self.error_markers.iter().map(String::as_str))
			.any(|marker| lowered.contains(marker))
	}
}

/// Builder for [`IdentityProviderProfile`] values.
#[derive(Debug)]
pub struct ProfileBuilder {
	id: ProfileId,
	host_matcher: Option<HostMatcher>,
	login_field_candidates: Vec<String>,
	password_field_candidates: Vec<String>,
	callback_param_candidates: Vec<String>,
	error_markers: Vec<String>,
	success_matcher: Option<HostMatcher>,
}
impl ProfileBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProfileId) -> Self {
		Self {
			id,
			host_matcher: None,
			login_field_candidates: Vec::new(),
			password_field_candidates: Vec::new(),
			callback_param_candidates: Vec::new(),
			error_markers: Vec::new(),
			success_matcher: None,
		}
	}

	/// Sets the provider host matcher.
	pub fn host_matcher(mut self, matcher: HostMatcher) -> Self {
		self.host_matcher = Some(matcher);

		self
	}

	/// Appends an identifier field name candidate.
	pub fn login_field(mut self, name: impl Into<String>) -> Self {
		self.login_field_candidates.push(name.into());

		self
	}

	/// Appends a secret field name candidate.
	pub fn password_field(mut self, name: impl Into<String>) -> Self {
		self.password_field_candidates.push(name.into());

		self
	}

	/// Appends a callback parameter name candidate.
	pub fn callback_param(mut self, name: impl Into<String>) -> Self {
		self.callback_param_candidates.push(name.into());

		self
	}

	/// Appends a login-error marker; stored lowercased.
	pub fn error_marker(mut self, marker: impl Into<String>) -> Self {
		self.error_markers.push(marker.into().to_lowercase());

		self
	}

	/// Overrides the success matcher; the default checks the portal's own authority.
	pub fn success_matcher(mut self, matcher: HostMatcher) -> Self {
		self.success_matcher = Some(matcher);

		self
	}

	/// Consumes the builder and validates the resulting profile.
	pub fn build(self) -> Result<IdentityProviderProfile, ProfileError> {
		let host_matcher = self
			.host_matcher
			.ok_or_else(|| ProfileError::MissingHostMatcher { id: self.id.to_string() })?;
		let pattern = match &host_matcher {
			HostMatcher::Exact(pattern)
			| HostMatcher::Suffix(pattern)
			| HostMatcher::Contains(pattern) => pattern,
		};

		if pattern.is_empty() {
			return Err(ProfileError::EmptyMatcherPattern { id: self.id.to_string() });
		}

		Ok(IdentityProviderProfile {
			id: self.id,
			host_matcher,
			login_field_candidates: self.login_field_candidates,
			password_field_candidates: self.password_field_candidates,
			callback_param_candidates: self.callback_param_candidates,
			error_markers: self.error_markers,
			success_matcher: self.success_matcher,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn profile_ids_reject_whitespace_and_length_abuse() {
		assert_eq!(ProfileId::new(""), Err(ProfileIdError::Empty));
		assert_eq!(ProfileId::new("with space"), Err(ProfileIdError::ContainsWhitespace));
		assert!(ProfileId::new("a".repeat(PROFILE_ID_MAX_LEN + 1)).is_err());
		assert!(ProfileId::new("ent-occitanie").is_ok());
	}

	#[test]
	fn host_matchers_compare_authorities_correctly() {
		assert!(HostMatcher::Exact("127.0.0.1:5123".into()).matches("127.0.0.1:5123"));
		assert!(!HostMatcher::Exact("127.0.0.1:5123".into()).matches("127.0.0.1:5999"));
		assert!(HostMatcher::Suffix("educonnect.education.gouv.fr".into())
			.matches("moncompte.educonnect.education.gouv.fr"));
		assert!(!HostMatcher::Suffix("educonnect.education.gouv.fr".into())
			.matches("fake-educonnect.education.gouv.fr.evil.example"));
		assert!(HostMatcher::Contains("cas".into()).matches("cas.ent.example:8443"));
	}

	#[test]
	fn builder_validates_matchers() {
		let id = ProfileId::new("broken").expect("Profile identifier should be valid.");

		assert!(matches!(
			IdentityProviderProfile::builder(id.clone()).build(),
			Err(ProfileError::MissingHostMatcher { .. })
		));
		assert!(matches!(
			IdentityProviderProfile::builder(id)
				.host_matcher(HostMatcher::Contains(String::new()))
				.build(),
			Err(ProfileError::EmptyMatcherPattern { .. })
		));
	}

	#[test]
	fn error_markers_merge_defaults_with_profile_specifics() {
		let id = ProfileId::new("marker-test").expect("Profile identifier should be valid.");
		let profile = IdentityProviderProfile::builder(id)
			.host_matcher(HostMatcher::Contains("idp".into()))
			.error_marker("Code établissement inconnu")
			.build()
			.expect("Profile should build.");

		assert!(profile.has_error_marker("<b>Identifiant ou mot de passe invalide</b>"));
		assert!(profile.has_error_marker("code établissement inconnu"));
		assert!(!profile.has_error_marker("Bienvenue sur votre espace"));
	}

	#[test]
	fn accented_uppercase_banners_still_match_markers() {
		let id = ProfileId::new("accent-test").expect("Profile identifier should be valid.");
		let profile = IdentityProviderProfile::builder(id)
			.host_matcher(HostMatcher::Contains("idp".into()))
			.error_marker("Échec de la connexion")
			.build()
			.expect("Profile should build.");

		assert!(profile.has_error_marker("<b>L'AUTHENTIFICATION A ÉCHOUÉ.</b>"));
		assert!(profile.has_error_marker("ÉCHEC DE LA CONNEXION"));
	}
}
