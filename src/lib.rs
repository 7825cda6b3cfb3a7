//! Rust's turnkey Pronote bridge - resolve ENT/CAS SSO dialects, drive multi-hop login flows,
//! and extract normalized student snapshots in one crate built for resilience.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod bridge;
pub mod error;
pub mod extract;
#[cfg(feature = "reqwest")] pub mod flow;
pub mod form;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")] pub mod resolver;
pub mod session;
pub mod snapshot;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::NavigatorConfig,
		provider::{HostMatcher, IdentityProviderProfile, ProfileId},
		resolver::AuthResolver,
	};

	/// Builds a navigator configuration that accepts the self-signed certificates produced by
	/// `httpmock` during tests and keeps timeouts short.
	pub fn test_navigator_config() -> NavigatorConfig {
		NavigatorConfig::default()
			.with_timeout(std::time::Duration::from_secs(5))
			.accept_invalid_certs()
	}

	/// Builds a profile whose host matcher targets exactly one `host[:port]` authority, the shape
	/// every mock identity provider in the test suite uses.
	pub fn exact_profile(id: &str, authority: &str) -> IdentityProviderProfile {
		let profile_id = ProfileId::new(id).expect("Profile identifier should be valid for tests.");

		IdentityProviderProfile::builder(profile_id)
			.host_matcher(HostMatcher::Exact(authority.into()))
			.build()
			.expect("Test profile should build successfully.")
	}

	/// Constructs a resolver over the provided profiles with the test navigator configuration.
	pub fn test_resolver(profiles: Vec<IdentityProviderProfile>) -> AuthResolver {
		AuthResolver::new(profiles).with_navigator_config(test_navigator_config())
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, LazyLock},
	};

	pub use regex::Regex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {httpmock as _, tokio as _};
