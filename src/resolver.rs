//! Strategy orchestration: walk the candidate list until one produces a session.

// self
use crate::{
	_prelude::*,
	http::{Navigator, NavigatorConfig},
	obs::{BridgeStage, StageOutcome, StageSpan, record_stage},
	provider::{AuthStrategy, DirectStrategy, IdentityProviderProfile, SsoProfileStrategy},
	session::{AuthSession, Credentials, Endpoint},
};

/// Orchestrates an ordered list of strategies until one succeeds or all are exhausted.
///
/// Priority order: the structured-client adapter when one is registered, then one SSO strategy
/// per configured profile, then the no-SSO direct attempt. First success wins and pre-empts
/// every later candidate; a credential rejection stops the walk early, since retrying wrong
/// credentials against the remaining providers wastes round trips without changing the outcome.
pub struct AuthResolver {
	strategies: Vec<Arc<dyn AuthStrategy>>,
	navigator_config: NavigatorConfig,
}
impl AuthResolver {
	/// Builds a resolver over the provided profiles, appending the direct attempt last.
	pub fn new(profiles: Vec<IdentityProviderProfile>) -> Self {
		let strategies = profiles
			.into_iter()
			.map(|profile| Arc::new(SsoProfileStrategy::new(profile)) as Arc<dyn AuthStrategy>)
			.chain([Arc::new(DirectStrategy) as Arc<dyn AuthStrategy>])
			.collect();

		Self { strategies, navigator_config: NavigatorConfig::default() }
	}

	/// Builds a resolver over the built-in profile registry.
	pub fn builtin() -> Self {
		Self::new(crate::provider::builtin_profiles())
	}

	/// Builds a resolver from an explicit strategy list; the caller controls ordering fully.
	pub fn from_strategies(strategies: Vec<Arc<dyn AuthStrategy>>) -> Self {
		Self { strategies, navigator_config: NavigatorConfig::default() }
	}

	/// Registers a structured-client adapter as the priority-zero strategy.
	pub fn with_structured_adapter(mut self, adapter: Arc<dyn AuthStrategy>) -> Self {
		self.strategies.insert(0, adapter);

		self
	}

	/// Overrides the navigator configuration applied to every candidate.
	pub fn with_navigator_config(mut self, config: NavigatorConfig) -> Self {
		self.navigator_config = config;

		self
	}

	/// Resolves an authenticated session for the credentials against the endpoint.
	///
	/// Empty credentials short-circuit to [`Error::MissingCredentials`] before any network
	/// access. Candidates run strictly sequentially, each over a fresh navigator (SSO flows are
	/// stateful per cookie jar); the winning navigator is bound into the returned session.
	pub async fn resolve(
		&self,
		credentials: &Credentials,
		endpoint: &Endpoint,
	) -> Result<AuthSession> {
		record_stage(BridgeStage::Resolve, StageOutcome::Attempt);

		if !credentials.is_complete() {
			record_stage(BridgeStage::Resolve, StageOutcome::Failure);

			return Err(Error::MissingCredentials {
				detail: "identifier and secret must both be non-empty".into(),
			});
		}

		let span = StageSpan::new(BridgeStage::Resolve, "resolve");
		let outcome = span.instrument(self.walk_candidates(credentials, endpoint)).await;

		record_stage(
			BridgeStage::Resolve,
			if outcome.is_ok() { StageOutcome::Success } else { StageOutcome::Failure },
		);

		outcome
	}

	async fn walk_candidates(
		&self,
		credentials: &Credentials,
		endpoint: &Endpoint,
	) -> Result<AuthSession> {
		let mut last_contact: Option<Error> = None;

		for strategy in &self.strategies {
			let navigator = Navigator::new(&self.navigator_config)?;

			match strategy.resolve(&navigator, credentials, endpoint).await {
				Ok(page) => {
					#[cfg(feature = "tracing")]
					tracing::info!(strategy = strategy.label(), url = %page.url, "session resolved");

					return Ok(AuthSession::new(navigator, page, strategy.label()));
				},
				Err(error) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(
						strategy = strategy.label(),
						classification = error
							.classification()
							.map(|classification| classification.as_str())
							.unwrap_or("none"),
						%error,
						"strategy failed",
					);

					if matches!(error, Error::LoginRejected { .. }) {
						// An identifier/secret rejection is definitive; trying further providers
						// only masks it.
						return Err(error);
					}
					if !matches!(error, Error::NoMatchingProvider { .. }) {
						last_contact = Some(error);
					}
				},
			}
		}

		Err(last_contact.unwrap_or_else(|| Error::NoMatchingProvider {
			detail: format!(
				"no configured strategy reached a login form for `{}`",
				endpoint.authority(),
			),
		}))
	}
}
impl Debug for AuthResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let labels: Vec<_> = self.strategies.iter().map(|strategy| strategy.label()).collect();

		f.debug_struct("AuthResolver").field("strategies", &labels).finish()
	}
}
