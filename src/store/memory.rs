//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionCredentials,
	store::{CompareAndSwapOutcome, SessionStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<SessionCredentials>>>;

/// Thread-safe storage backend that keeps the pair in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store that already holds `credentials`.
	pub fn with_credentials(credentials: SessionCredentials) -> Self {
		Self(Arc::new(RwLock::new(Some(credentials))))
	}

	/// Returns the stored pair without going through the async contract.
	pub fn snapshot(&self) -> Option<SessionCredentials> {
		self.0.read().clone()
	}

	fn cas_now(
		slot: Slot,
		expected_access: &str,
		replacement: SessionCredentials,
	) -> CompareAndSwapOutcome {
		let mut guard = slot.write();
		let outcome = CompareAndSwapOutcome::evaluate(guard.as_ref(), expected_access);

		if matches!(outcome, CompareAndSwapOutcome::Updated) {
			*guard = Some(replacement);
		}

		outcome
	}
}
impl SessionStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<SessionCredentials>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, credentials: SessionCredentials) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(credentials);

			Ok::<_, StoreError>(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, Option<SessionCredentials>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.write().take()) })
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: SessionCredentials,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::cas_now(slot, expected_access, replacement)) })
	}
}
