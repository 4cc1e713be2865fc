// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gateway traffic and refresh outcomes.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
	requests: AtomicU64,
	retries: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_success: AtomicU64,
	refresh_failure: AtomicU64,
	refresh_coalesced: AtomicU64,
}
impl GatewayMetrics {
	/// Returns the number of authorized requests dispatched, replays included.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of requests replayed after a refresh.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges started against the backend.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that rotated the stored pair.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_success.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that ended the session.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failure.load(Ordering::Relaxed)
	}

	/// Returns the number of callers that joined a refresh completed by someone else.
	pub fn refresh_coalesced(&self) -> u64 {
		self.refresh_coalesced.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_coalesced(&self) {
		self.refresh_coalesced.fetch_add(1, Ordering::Relaxed);
	}
}
