//! Strategy abstraction: one concrete way of obtaining an authenticated session.
//!
//! A structured portal client and page-level scraping are interchangeable variants behind this
//! one session-producing interface. The crate ships the SSO-profile and direct variants; a
//! structured-client adapter can be registered on the resolver as a priority-zero strategy when
//! a deployment has access to the portal's richer channel.

// self
use crate::{
	_prelude::*,
	flow::SsoFlowDriver,
	form::FormIntrospector,
	http::{FetchedPage, Navigator},
	obs::{BridgeStage, StageOutcome, StageSpan, record_stage},
	provider::IdentityProviderProfile,
	session::{Credentials, Endpoint},
};

/// Boxed future returned by strategy resolutions.
pub type StrategyFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchedPage>> + Send + 'a>>;

/// One way of producing an authenticated session.
///
/// Implementors run to completion, never partially: a strategy either returns the final page
/// reached on the portal's authority or a classified error. The navigator owns the cookie jar
/// the attempt accumulates; the resolver binds it into an
/// [`AuthSession`](crate::session::AuthSession) on success.
pub trait AuthStrategy: Send + Sync {
	/// Returns a stable label for spans, metrics, and the resulting session.
	fn label(&self) -> &str;

	/// Drives the strategy to completion over the provided navigator.
	fn resolve<'a>(
		&'a self,
		navigator: &'a Navigator,
		credentials: &'a Credentials,
		endpoint: &'a Endpoint,
	) -> StrategyFuture<'a>;
}

/// Strategy driving the generic SSO flow for one identity provider profile.
#[derive(Clone, Debug)]
pub struct SsoProfileStrategy {
	profile: IdentityProviderProfile,
}
impl SsoProfileStrategy {
	/// Wraps a profile into a resolvable strategy.
	pub fn new(profile: IdentityProviderProfile) -> Self {
		Self { profile }
	}
}
impl AuthStrategy for SsoProfileStrategy {
	fn label(&self) -> &str {
		self.profile.id.as_ref()
	}

	fn resolve<'a>(
		&'a self,
		navigator: &'a Navigator,
		credentials: &'a Credentials,
		endpoint: &'a Endpoint,
	) -> StrategyFuture<'a> {
		Box::pin(async move {
			record_stage(BridgeStage::SsoFlow, StageOutcome::Attempt);

			let span = StageSpan::new(BridgeStage::SsoFlow, "resolve");
			let outcome = span
				.instrument(SsoFlowDriver::new(navigator, credentials, endpoint, &self.profile).run())
				.await;

			record_stage(
				BridgeStage::SsoFlow,
				if outcome.is_ok() { StageOutcome::Success } else { StageOutcome::Failure },
			);

			outcome
		})
	}
}

/// No-SSO strategy: log in on the portal's own host, or accept an already-open page.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectStrategy;
impl AuthStrategy for DirectStrategy {
	fn label(&self) -> &str {
		"direct"
	}

	fn resolve<'a>(
		&'a self,
		navigator: &'a Navigator,
		credentials: &'a Credentials,
		endpoint: &'a Endpoint,
	) -> StrategyFuture<'a> {
		Box::pin(async move {
			let page = navigator.get(endpoint.entry_url().clone()).await?;

			if !endpoint.matches(&page.url) {
				return Err(Error::NoMatchingProvider {
					detail: format!(
						"portal redirected to `{}`, which requires an SSO dialect",
						page.url,
					),
				});
			}

			let Some(form) = FormIntrospector::locate(&page.body, &page.url) else {
				// No login form on the portal's own host: the page is already the destination.
				return Ok(page);
			};
			let (Some(identifier_name), Some(password_name)) =
				(form.identifier_field(&[]), form.password_field(&[]))
			else {
				return Err(Error::NoMatchingProvider {
					detail: "portal login form exposes no recognizable credential fields".into(),
				});
			};
			let fields = form.submit_fields(identifier_name, password_name, credentials);
			let submitted = navigator.post_form(form.action.clone(), &fields).await?;

			if has_direct_error_marker(&submitted.body) {
				return Err(Error::LoginRejected {
					detail: "portal rejected the direct login".into(),
				});
			}
			if !endpoint.matches(&submitted.url) {
				return Err(Error::CallbackNotReached {
					detail: format!("direct login left the portal for `{}`", submitted.url),
				});
			}

			Ok(submitted)
		})
	}
}

fn has_direct_error_marker(body: &str) -> bool {
	let lowered = body.to_lowercase();

	crate::provider::DEFAULT_ERROR_MARKERS.iter().any(|marker| lowered.contains(marker))
}
