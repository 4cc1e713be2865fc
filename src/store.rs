//! Storage contracts and built-in store implementations for session credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::SessionCredentials};

/// Boxed future returned by every [`SessionStore`] method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Externally durable home of a single session's credential pair.
///
/// The gateway is the only writer; implementations need not coordinate multiple writers beyond
/// making [`compare_and_swap`](SessionStore::compare_and_swap) atomic.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Fetches the stored pair, if present.
	fn load(&self) -> StoreFuture<'_, Option<SessionCredentials>>;

	/// Persists or replaces the stored pair.
	fn save(&self, credentials: SessionCredentials) -> StoreFuture<'_, ()>;

	/// Deletes the stored pair, returning what was removed.
	fn clear(&self) -> StoreFuture<'_, Option<SessionCredentials>>;

	/// Atomically replaces the pair if its access credential still equals `expected_access`.
	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: SessionCredentials,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a credential compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The access credential matched and the pair was replaced.
	Updated,
	/// A pair exists but carries a different access credential.
	Mismatch,
	/// No pair is stored.
	Missing,
}
impl CompareAndSwapOutcome {
	pub(crate) fn evaluate(current: Option<&SessionCredentials>, expected_access: &str) -> Self {
		match current {
			Some(existing) if existing.has_access_token(expected_access) => Self::Updated,
			Some(_) => Self::Mismatch,
			None => Self::Missing,
		}
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
