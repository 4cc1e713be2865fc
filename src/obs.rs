//! Optional observability helpers for gateway calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_gateway.call` with the `call` (kind)
//!   and `stage` (call site) fields, plus an `error` field stamped on failure. Coalesced refreshes,
//!   invalidated sessions, and ignored logout failures are logged as events.
//! - Enable `metrics` to increment `session_gateway_call_total` (labeled by `call` + `outcome`),
//!   `session_gateway_call_failure_total` (`call` + `error`, where auth failures report their
//!   reason), `session_gateway_session_invalidated_total` (`reason`), and
//!   `session_gateway_refresh_coalesced_total`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway call kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authorized backend request (including its replay).
	Request,
	/// Credential refresh.
	Refresh,
	/// Identity lookup.
	Identity,
	/// Credential login.
	SignIn,
	/// Best-effort logout.
	SignOut,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Identity => "identity",
			CallKind::SignIn => "sign_in",
			CallKind::SignOut => "sign_out",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a gateway helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
