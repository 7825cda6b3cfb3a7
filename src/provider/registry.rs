//! Static, ordered registry of known SSO dialects.
//!
//! Ordering is the priority order the resolver walks: institution-specific dialects come before
//! the generic CAS profile, and the resolver itself appends the no-SSO direct attempt last.

// self
use crate::provider::{HostMatcher, IdentityProviderProfile, ProfileId};

/// Returns the built-in profile table in priority order.
pub fn builtin_profiles() -> Vec<IdentityProviderProfile> {
	[
		educonnect(),
		ent_occitanie(),
		ent_ile_de_france(),
		ent_hauts_de_france(),
		cas_generic(),
	]
	.into_iter()
	.collect()
}

fn profile_id(value: &'static str) -> ProfileId {
	// Built-in identifiers are compile-time literals validated by tests below.
	ProfileId::new(value).unwrap_or_else(|_| panic!("Built-in profile id `{value}` is invalid."))
}

/// EduConnect, the national education identity provider.
fn educonnect() -> IdentityProviderProfile {
	IdentityProviderProfile::builder(profile_id("educonnect"))
		.host_matcher(HostMatcher::Suffix("educonnect.education.gouv.fr".into()))
		.login_field("j_username")
		.password_field("j_password")
		.error_marker("identifiant ou mot de passe invalide")
		.build()
		.unwrap_or_else(|e| panic!("Built-in profile should validate: {e}."))
}

/// The Occitanie regional ENT, spread over several per-department hosts.
fn ent_occitanie() -> IdentityProviderProfile {
	IdentityProviderProfile::builder(profile_id("ent-occitanie"))
		.host_matcher(HostMatcher::Contains("mon-ent-occitanie".into()))
		.login_field("email")
		.callback_param("service")
		.build()
		.unwrap_or_else(|e| panic!("Built-in profile should validate: {e}."))
}

/// The Île-de-France lycée ENT.
fn ent_ile_de_france() -> IdentityProviderProfile {
	IdentityProviderProfile::builder(profile_id("ent-iledefrance"))
		.host_matcher(HostMatcher::Suffix("monlycee.net".into()))
		.login_field("email")
		.error_marker("adresse mail ou mot de passe incorrect")
		.build()
		.unwrap_or_else(|e| panic!("Built-in profile should validate: {e}."))
}

/// The Hauts-de-France ENT.
fn ent_hauts_de_france() -> IdentityProviderProfile {
	IdentityProviderProfile::builder(profile_id("ent-hdf"))
		.host_matcher(HostMatcher::Suffix("enthdf.fr".into()))
		.login_field("email")
		.build()
		.unwrap_or_else(|e| panic!("Built-in profile should validate: {e}."))
}

/// Generic Apereo-style CAS deployments; the last resort before a direct attempt.
fn cas_generic() -> IdentityProviderProfile {
	IdentityProviderProfile::builder(profile_id("cas-generic"))
		.host_matcher(HostMatcher::Contains("cas".into()))
		.login_field("username")
		.callback_param("service")
		.error_marker("les identifiants saisis sont incorrects")
		.build()
		.unwrap_or_else(|e| panic!("Built-in profile should validate: {e}."))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builtin_table_is_ordered_specific_before_generic() {
		let profiles = builtin_profiles();
		let ids: Vec<_> = profiles.iter().map(|profile| profile.id.as_ref()).collect();

		assert_eq!(
			ids,
			["educonnect", "ent-occitanie", "ent-iledefrance", "ent-hdf", "cas-generic"],
		);
		assert_eq!(
			ids.last().copied(),
			Some("cas-generic"),
			"The generic dialect must stay last so specific dialects pre-empt it.",
		);
	}

	#[test]
	fn builtin_profiles_recognize_their_hosts() {
		let profiles = builtin_profiles();

		assert!(profiles[0].host_matcher.matches("moncompte.educonnect.education.gouv.fr"));
		assert!(profiles[1].host_matcher.matches("cas.mon-ent-occitanie.fr"));
		assert!(profiles[2].host_matcher.matches("ent.monlycee.net"));
		assert!(profiles[4].host_matcher.matches("cas.ent27.fr"));
	}
}
