//! Identity provider profiles, the built-in registry, and session-producing strategies.

/// Declarative identity provider profiles.
pub mod profile;
/// Static, ordered registry of known SSO dialects.
pub mod registry;
/// Strategy abstraction over the ways of obtaining an authenticated session.
#[cfg(feature = "reqwest")]
pub mod strategy;

pub use profile::*;
pub use registry::*;
#[cfg(feature = "reqwest")] pub use strategy::*;
