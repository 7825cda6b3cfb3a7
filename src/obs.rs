//! Optional observability helpers for bridge stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pronote_bridge.stage` with the `stage` and
//!   `site` fields, plus per-transition debug events from the SSO flow driver.
//! - Enable `metrics` to increment the `pronote_bridge_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//!
//! Credentials never appear in any span, event, or label.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge stages observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeStage {
	/// Strategy orchestration inside the resolver.
	Resolve,
	/// One profile's SSO flow.
	SsoFlow,
	/// Snapshot extraction over the authenticated page.
	Extract,
}
impl BridgeStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BridgeStage::Resolve => "resolve",
			BridgeStage::SsoFlow => "sso_flow",
			BridgeStage::Extract => "extract",
		}
	}
}
impl Display for BridgeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a bridge stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
