//! Simple file-backed [`SessionStore`] for desktop shells and long-running bots.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::SessionCredentials,
	store::{CompareAndSwapOutcome, SessionStore, StoreError, StoreFuture},
};

/// Persists the session pair to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<SessionCredentials>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading an existing session.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Option<SessionCredentials>, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};

		if bytes.is_empty() {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: Option<&SessionCredentials>) -> Result<(), StoreError> {
		let Some(credentials) = contents else {
			return match fs::remove_file(&self.path) {
				Ok(()) => Ok(()),
				Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
				Err(e) => Err(StoreError::Backend {
					message: format!("Failed to remove {}: {e}", self.path.display()),
				}),
			};
		};

		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(credentials).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl SessionStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<SessionCredentials>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn save(&self, credentials: SessionCredentials) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(Some(&credentials))?;
			*guard = Some(credentials);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, Option<SessionCredentials>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(None)?;

			Ok(guard.take())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_access: &'a str,
		replacement: SessionCredentials,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let outcome = CompareAndSwapOutcome::evaluate(guard.as_ref(), expected_access);

			if matches!(outcome, CompareAndSwapOutcome::Updated) {
				self.persist_locked(Some(&replacement))?;
				*guard = Some(replacement);
			}

			Ok(outcome)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"session_gateway_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(SessionCredentials::new("tok1").with_refresh_token("ref1")))
			.expect("Failed to save fixture pair to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.load())
			.expect("Failed to load fixture pair from file store.")
			.expect("File store lost the session after reopen.");

		assert!(fetched.has_access_token("tok1"));
		assert_eq!(fetched.refresh_token.as_ref().map(|secret| secret.expose()), Some("ref1"));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_removes_snapshot_and_cas_rotates() {
		let path = temp_path("clear");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(SessionCredentials::new("tok1").with_refresh_token("ref1")))
			.expect("Failed to save fixture pair to file store.");

		let mismatch = rt
			.block_on(store.compare_and_swap("tok0", SessionCredentials::new("tok9")))
			.expect("CAS with a stale access token should not error.");

		assert_eq!(mismatch, CompareAndSwapOutcome::Mismatch);

		let updated = rt
			.block_on(store.compare_and_swap(
				"tok1",
				SessionCredentials::new("tok2").with_refresh_token("ref2"),
			))
			.expect("CAS with the current access token should not error.");

		assert_eq!(updated, CompareAndSwapOutcome::Updated);

		let reopened = FileStore::open(&path).expect("Failed to reopen rotated snapshot.");

		assert!(
			rt.block_on(reopened.load())
				.expect("Failed to load rotated pair.")
				.is_some_and(|pair| pair.has_access_token("tok2"))
		);

		let removed = rt.block_on(store.clear()).expect("Clearing the file store should succeed.");

		assert!(removed.is_some_and(|pair| pair.has_access_token("tok2")));
		assert!(!path.exists(), "Clearing must delete the snapshot file.");
		assert!(
			FileStore::open(&path)
				.expect("Reopening a cleared store should succeed.")
				.inner
				.read()
				.is_none()
		);
	}
}
