#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use pronote_bridge::{
	error::{Error, FailureClassification},
	http::NavigatorConfig,
	provider::{HostMatcher, IdentityProviderProfile, ProfileId},
	resolver::AuthResolver,
	session::{Credentials, Endpoint},
};

const LOGIN_FORM: &str = r#"<form action="/cas/login" method="post">
	<input type="text" name="username"/>
	<input type="password" name="password"/>
</form>"#;

fn resolver(profiles: Vec<IdentityProviderProfile>) -> AuthResolver {
	AuthResolver::new(profiles)
		.with_navigator_config(NavigatorConfig::default().with_timeout(Duration::from_secs(5)))
}

fn exact_profile(id: &str, authority: String) -> IdentityProviderProfile {
	let id = ProfileId::new(id).expect("Profile identifier should be valid.");

	IdentityProviderProfile::builder(id)
		.host_matcher(HostMatcher::Exact(authority))
		.build()
		.expect("Profile should build successfully.")
}

#[tokio::test]
async fn empty_credentials_fail_before_any_network_access() {
	let portal = MockServer::start_async().await;
	let entry = portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/eleve.html");
			then.status(200).body("<h1>Espace élève</h1>");
		})
		.await;
	let endpoint = Endpoint::parse(&portal.url("/portal/")).expect("Endpoint should parse.");
	let err = resolver(vec![])
		.resolve(&Credentials::new("jane.doe", "   "), &endpoint)
		.await
		.expect_err("A blank secret should fail fast.");

	assert!(matches!(err, Error::MissingCredentials { .. }));
	assert_eq!(err.http_status(), 400);
	assert_eq!(entry.hits_async().await, 0);
}

#[tokio::test]
async fn direct_strategy_wins_when_the_portal_hosts_its_own_login() {
	let portal = MockServer::start_async().await;

	portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/eleve.html");
			then.status(200).header("content-type", "text/html").body(
				r#"<form action="/portal/login" method="post">
					<input type="text" name="login"/>
					<input type="password" name="pwd"/>
				</form>"#,
			);
		})
		.await;
	portal
		.mock_async(|when, then| {
			when.method(POST).path("/portal/login");
			then.status(302).header("location", portal.url("/portal/home"));
		})
		.await;
	portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/home");
			then.status(200).header("content-type", "text/html").body("<h1>Bienvenue</h1>");
		})
		.await;

	let endpoint = Endpoint::parse(&portal.url("/portal/")).expect("Endpoint should parse.");
	let session = resolver(vec![])
		.resolve(&Credentials::new("jane.doe", "hunter2"), &endpoint)
		.await
		.expect("The direct strategy should log in on the portal's own host.");

	assert_eq!(session.strategy(), "direct");
	assert_eq!(session.page().url.path(), "/portal/home");
}

#[tokio::test]
async fn an_sso_profile_strategy_produces_the_session() {
	let portal = MockServer::start_async().await;
	let provider = MockServer::start_async().await;
	let login_url = provider.url("/cas/login");

	portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/eleve.html");
			then.status(302).header("location", &login_url);
		})
		.await;
	provider
		.mock_async(|when, then| {
			when.method(GET).path("/cas/login");
			then.status(200).header("content-type", "text/html").body(LOGIN_FORM);
		})
		.await;
	provider
		.mock_async(|when, then| {
			when.method(POST).path("/cas/login");
			then.status(302).header("location", portal.url("/portal/validated"));
		})
		.await;
	portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/validated");
			then.status(200).header("content-type", "text/html").body("<h1>Espace élève</h1>");
		})
		.await;

	let endpoint = Endpoint::parse(&portal.url("/portal/")).expect("Endpoint should parse.");
	let session = resolver(vec![exact_profile("mock-cas", provider.address().to_string())])
		.resolve(&Credentials::new("jane.doe", "hunter2"), &endpoint)
		.await
		.expect("The profile's SSO flow should produce a session.");

	assert_eq!(session.strategy(), "mock-cas");
	assert_eq!(session.page().url.path(), "/portal/validated");
}

#[tokio::test]
async fn a_login_rejection_stops_the_walk_immediately() {
	let portal = MockServer::start_async().await;
	let provider = MockServer::start_async().await;
	let login_url = provider.url("/cas/login");
	let entry = portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/eleve.html");
			then.status(302).header("location", &login_url);
		})
		.await;

	provider
		.mock_async(|when, then| {
			when.method(GET).path("/cas/login");
			then.status(200).header("content-type", "text/html").body(LOGIN_FORM);
		})
		.await;
	provider
		.mock_async(|when, then| {
			when.method(POST).path("/cas/login");
			then.status(200)
				.header("content-type", "text/html")
				.body("<p>Identifiant ou mot de passe incorrect.</p>");
		})
		.await;

	let endpoint = Endpoint::parse(&portal.url("/portal/")).expect("Endpoint should parse.");
	let profiles = vec![
		exact_profile("rejecting-idp", provider.address().to_string()),
		exact_profile("never-tried", "second.idp.invalid".into()),
	];
	let err = resolver(profiles)
		.resolve(&Credentials::new("jane.doe", "wrong"), &endpoint)
		.await
		.expect_err("A credential rejection should pre-empt every later candidate.");

	assert!(matches!(err, Error::LoginRejected { .. }));
	// One entry fetch: neither the second profile nor the direct attempt ever ran.
	assert_eq!(entry.hits_async().await, 1);
}

#[tokio::test]
async fn exhausted_candidates_report_no_matching_provider() {
	let portal = MockServer::start_async().await;
	let provider = MockServer::start_async().await;
	let login_url = provider.url("/cas/maintenance");

	portal
		.mock_async(|when, then| {
			when.method(GET).path("/portal/eleve.html");
			then.status(302).header("location", &login_url);
		})
		.await;
	provider
		.mock_async(|when, then| {
			when.method(GET).path("/cas/maintenance");
			then.status(200).header("content-type", "text/html").body("<p>Maintenance.</p>");
		})
		.await;

	let endpoint = Endpoint::parse(&portal.url("/portal/")).expect("Endpoint should parse.");
	let err = resolver(vec![exact_profile("elsewhere", "idp.nowhere.invalid".into())])
		.resolve(&Credentials::new("jane.doe", "hunter2"), &endpoint)
		.await
		.expect_err("No candidate recognizes this redirect target.");

	assert!(matches!(err, Error::NoMatchingProvider { .. }));
	assert_eq!(err.classification(), Some(FailureClassification::NoMatchingProvider));
}

#[tokio::test]
async fn transport_failures_surface_as_network_errors() {
	// Nothing listens on the discard port; the connection is refused immediately.
	let endpoint = Endpoint::parse("http://127.0.0.1:9/portal/").expect("Endpoint should parse.");
	let err = resolver(vec![])
		.resolve(&Credentials::new("jane.doe", "hunter2"), &endpoint)
		.await
		.expect_err("An unreachable portal should fail with a network error.");

	assert!(matches!(err, Error::Network { .. }));
	assert_eq!(err.classification(), Some(FailureClassification::NetworkError));
	assert_eq!(err.http_status(), 401);
}
