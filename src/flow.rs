//! Generic CAS-like SSO flow driver.
//!
//! The driver is an explicit state machine: `Start → AtTarget → AtProvider → Submitted →
//! AtCallback → Verified`, failing from any state. SSO deployments differ in whether they
//! redirect back to the portal automatically or require the client to revisit the service URL,
//! so both return paths are encoded as explicit steps (the stored callback fetch, then exactly
//! one direct re-visit of the entry resource) instead of silent retries hidden in a loop; the
//! machine stays auditable and testable.

// self
use crate::{
	_prelude::*,
	form::FormIntrospector,
	http::{FetchedPage, Navigator},
	provider::IdentityProviderProfile,
	session::{Credentials, Endpoint, url_authority},
};

static ABSOLUTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"https?://[^"'<>\s\\]+"#).expect("Absolute URL pattern should compile.")
});

/// States of the SSO flow machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
	/// Nothing issued yet.
	Start,
	/// Entry resource fetched; final URL recorded.
	AtTarget,
	/// Landed on the identity provider; callback captured when present.
	AtProvider,
	/// Credentials submitted through the introspected form.
	Submitted,
	/// Stored callback fetched explicitly.
	AtCallback,
	/// Arrived back on the portal's authority.
	Verified,
}
impl FlowState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowState::Start => "start",
			FlowState::AtTarget => "at_target",
			FlowState::AtProvider => "at_provider",
			FlowState::Submitted => "submitted",
			FlowState::AtCallback => "at_callback",
			FlowState::Verified => "verified",
		}
	}
}
impl Display for FlowState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Drives one profile's SSO dance over one navigator.
#[derive(Debug)]
pub struct SsoFlowDriver<'a> {
	navigator: &'a Navigator,
	credentials: &'a Credentials,
	endpoint: &'a Endpoint,
	profile: &'a IdentityProviderProfile,
	state: FlowState,
}
impl<'a> SsoFlowDriver<'a> {
	/// Binds the driver to one invocation's collaborators.
	pub fn new(
		navigator: &'a Navigator,
		credentials: &'a Credentials,
		endpoint: &'a Endpoint,
		profile: &'a IdentityProviderProfile,
	) -> Self {
		Self { navigator, credentials, endpoint, profile, state: FlowState::Start }
	}

	/// Returns the state the machine currently sits in.
	pub fn state(&self) -> FlowState {
		self.state
	}

	/// Runs the machine to a terminal state, returning the verified portal page.
	pub async fn run(mut self) -> Result<FetchedPage> {
		// Start → AtTarget.
		let page = self.navigator.get(self.endpoint.entry_url().clone()).await?;

		self.advance(FlowState::AtTarget, &page.url);

		if self.endpoint.matches(&page.url) {
			return Err(Error::NoMatchingProvider {
				detail: format!(
					"portal never redirected away from its own host for profile `{}`",
					self.profile.id,
				),
			});
		}
		if !self.profile.host_matcher.matches(&url_authority(&page.url)) {
			return Err(Error::NoMatchingProvider {
				detail: format!(
					"redirect landed on `{}`, which profile `{}` does not recognize",
					url_authority(&page.url),
					self.profile.id,
				),
			});
		}

		// AtTarget → AtProvider. The callback is the single most load-bearing piece of state in
		// the flow: many providers never redirect back to it automatically.
		let callback = self.capture_callback(&page);

		self.advance(FlowState::AtProvider, &page.url);

		// AtProvider → Submitted.
		let Some(form) = FormIntrospector::locate(&page.body, &page.url) else {
			return Err(Error::NoMatchingProvider {
				detail: format!("no login form found on `{}`", url_authority(&page.url)),
			});
		};
		let Some(identifier_name) =
			form.identifier_field(&self.profile.login_field_candidates).map(str::to_owned)
		else {
			return Err(Error::NoMatchingProvider {
				detail: format!(
					"login form on `{}` exposes no identifier field",
					url_authority(&page.url),
				),
			});
		};
		let Some(password_name) =
			form.password_field(&self.profile.password_field_candidates).map(str::to_owned)
		else {
			return Err(Error::NoMatchingProvider {
				detail: format!(
					"login form on `{}` exposes no secret field",
					url_authority(&page.url),
				),
			});
		};
		let fields = form.submit_fields(&identifier_name, &password_name, self.credentials);
		let submitted = self.navigator.post_form(form.action.clone(), &fields).await?;

		self.advance(FlowState::Submitted, &submitted.url);

		// Submitted → Failed(LoginRejected) when the provider kept us and complained.
		if self.profile.host_matcher.matches(&url_authority(&submitted.url))
			&& self.profile.has_error_marker(&submitted.body)
		{
			return Err(Error::LoginRejected {
				detail: format!("provider `{}` reported a login failure", self.profile.id),
			});
		}
		if self.arrived(&submitted.url) {
			self.advance(FlowState::Verified, &submitted.url);

			return Ok(submitted);
		}

		// Submitted → AtCallback.
		if let Some(callback) = callback.and_then(|raw| resolve_callback(&raw, &submitted.url)) {
			let returned = self.navigator.get(callback).await?;

			self.advance(FlowState::AtCallback, &returned.url);

			if self.arrived(&returned.url) {
				self.advance(FlowState::Verified, &returned.url);

				return Ok(returned);
			}
		}

		// Exactly one fallback: some providers complete the session server-side and a second
		// direct visit succeeds even when the callback link does not.
		let revisited = self.navigator.get(self.endpoint.entry_url().clone()).await?;

		if self.arrived(&revisited.url) {
			self.advance(FlowState::Verified, &revisited.url);

			return Ok(revisited);
		}

		Err(Error::CallbackNotReached {
			detail: format!(
				"provider `{}` accepted the login but the portal at `{}` was never reached",
				self.profile.id,
				self.endpoint.authority(),
			),
		})
	}

	/// Extracts the callback value: query parameters first, then a body pattern search for an
	/// absolute URL pointing back at the portal's authority.
	fn capture_callback(&self, page: &FetchedPage) -> Option<String> {
		for name in self.profile.callback_params() {
			if let Some((_, value)) =
				page.url.query_pairs().find(|(key, value)| key == name && !value.is_empty())
			{
				return Some(value.into_owned());
			}
		}

		let endpoint_authority = self.endpoint.authority();

		ABSOLUTE_URL_RE.find_iter(&page.body).map(|m| m.as_str().replace("&amp;", "&")).find(
			|candidate| {
				Url::parse(candidate)
					.map(|url| url_authority(&url).eq_ignore_ascii_case(&endpoint_authority))
					.unwrap_or(false)
			},
		)
	}

	fn arrived(&self, url: &Url) -> bool {
		if self.endpoint.matches(url) {
			return true;
		}

		self.profile
			.success_matcher
			.as_ref()
			.is_some_and(|matcher| matcher.matches(&url_authority(url)))
	}

	fn advance(&mut self, next: FlowState, _reached: &Url) {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			profile = %self.profile.id,
			from = self.state.as_str(),
			to = next.as_str(),
			url = %_reached,
			"sso flow transition",
		);

		self.state = next;
	}
}

fn resolve_callback(raw: &str, current: &Url) -> Option<Url> {
	Url::parse(raw).or_else(|_| current.join(raw)).ok()
}
