// self
use crate::{_prelude::*, error::AuthFailure, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by gateway calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"session_gateway.call",
				call = kind.as_str(),
				stage,
				error = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Stamps the span's `error` field with [`Error::label`].
	pub fn record_failure(&self, error: &Error) {
		#[cfg(feature = "tracing")]
		self.span.record("error", error.label());
		#[cfg(not(feature = "tracing"))]
		let _ = error;
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes that a caller reused a pair rotated by a concurrent refresh.
pub fn refresh_coalesced() {
	#[cfg(feature = "tracing")]
	tracing::debug!("refresh already completed by a concurrent caller; reusing rotated pair");
}

/// Notes that the session was dropped and the user must sign in again.
pub fn session_invalidated(reason: AuthFailure) {
	#[cfg(feature = "tracing")]
	tracing::warn!(reason = reason.as_str(), "session invalidated");
	#[cfg(not(feature = "tracing"))]
	let _ = reason;
}

/// Notes a failure that the gateway absorbs instead of returning it verbatim.
pub fn call_failed(kind: CallKind, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(call = kind.as_str(), error = %error, "gateway call failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn events_are_noops_without_subscribers() {
		let err = crate::error::TransportError::Io(std::io::Error::other("reset"));

		refresh_coalesced();
		session_invalidated(AuthFailure::RetryRejected);
		call_failed(CallKind::SignOut, &err);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);

		span.record_failure(&Error::AuthFailed { reason: AuthFailure::RefreshTransport });
	}
}
