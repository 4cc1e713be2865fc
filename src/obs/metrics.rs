// self
use crate::{
	_prelude::*,
	error::AuthFailure,
	obs::{CallKind, CallOutcome},
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_gateway_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a failed call, labeled with [`Error::label`] so auth failures carry their reason.
pub fn record_call_failure(kind: CallKind, error: &Error) {
	record_call_outcome(kind, CallOutcome::Failure);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_gateway_call_failure_total",
			"call" => kind.as_str(),
			"error" => error.label()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = error;
	}
}

/// Counts sessions the gateway ended, by reason.
pub fn record_session_invalidated(reason: AuthFailure) {
	#[cfg(feature = "metrics")]
	metrics::counter!("session_gateway_session_invalidated_total", "reason" => reason.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = reason;
}

/// Counts callers that reused a pair rotated by a concurrent refresh.
pub fn record_refresh_coalesced() {
	#[cfg(feature = "metrics")]
	metrics::counter!("session_gateway_refresh_coalesced_total").increment(1);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_a_global_recorder() {
		record_call_outcome(CallKind::Refresh, CallOutcome::Attempt);
		record_call_failure(
			CallKind::Request,
			&Error::AuthFailed { reason: AuthFailure::RefreshRejected { status: 401 } },
		);
		record_session_invalidated(AuthFailure::RotationUnsaved);
		record_refresh_coalesced();
	}
}
