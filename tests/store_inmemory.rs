// crates.io
use time::macros;
// self
use session_gateway::{
	_preludet::*,
	auth::SessionCredentials,
	store::{CompareAndSwapOutcome, MemoryStore, SessionStore},
};

fn build_session(access: &str, refresh: Option<&str>) -> SessionCredentials {
	let session =
		SessionCredentials::new(access).issued_at(macros::datetime!(2025-11-10 12:00 UTC));

	match refresh {
		Some(value) => session.with_refresh_token(value),
		None => session,
	}
}

#[tokio::test]
async fn save_and_load_round_trip() {
	let store = MemoryStore::default();
	let session = build_session("access-1", Some("refresh-1"));

	assert!(store.load().await.expect("Loading an empty memory store should succeed.").is_none());

	store.save(session.clone()).await.expect("Saving session fixture should succeed.");

	let loaded = store
		.load()
		.await
		.expect("Loading from memory store should succeed.")
		.expect("Stored session should remain present.");

	assert_eq!(loaded, session);
	assert_eq!(store.snapshot(), Some(session));
}

#[tokio::test]
async fn cas_success_mismatch_and_missing() {
	let store = MemoryStore::with_credentials(build_session("access-initial", Some("refresh-old")));
	let replacement = build_session("access-new", Some("refresh-new"));
	let outcome = store
		.compare_and_swap("access-initial", replacement.clone())
		.await
		.expect("CAS should succeed when access tokens match.");

	assert_eq!(outcome, CompareAndSwapOutcome::Updated);
	assert_eq!(
		store.snapshot().and_then(|s| s.refresh_token).as_ref().map(|secret| secret.expose()),
		Some("refresh-new")
	);

	let mismatch = store
		.compare_and_swap("access-initial", build_session("access-stale", None))
		.await
		.expect("CAS should report a mismatch when the access token already rotated.");

	assert_eq!(mismatch, CompareAndSwapOutcome::Mismatch);
	assert_eq!(store.snapshot(), Some(replacement));

	let cleared = store.clear().await.expect("Clearing the memory store should succeed.");

	assert!(cleared.is_some_and(|session| session.has_access_token("access-new")));

	let missing = store
		.compare_and_swap("access-new", build_session("access-late", None))
		.await
		.expect("CAS should report a missing session after clear.");

	assert_eq!(missing, CompareAndSwapOutcome::Missing);
	assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn concurrent_cas_allows_single_winner() {
	let store = MemoryStore::with_credentials(build_session("access-base", Some("refresh-base")));
	let store_a = store.clone();
	let store_b = store.clone();
	let task_a = tokio::spawn(async move {
		store_a
			.compare_and_swap("access-base", build_session("access-a", Some("refresh-a")))
			.await
			.expect("CAS task A should complete successfully.")
	});
	let task_b = tokio::spawn(async move {
		store_b
			.compare_and_swap("access-base", build_session("access-b", Some("refresh-b")))
			.await
			.expect("CAS task B should complete successfully.")
	});
	let (outcome_a, outcome_b) = tokio::join!(task_a, task_b);
	let outcomes = [
		outcome_a.expect("CAS task A should not panic."),
		outcome_b.expect("CAS task B should not panic."),
	];
	let successes =
		outcomes.iter().filter(|outcome| matches!(outcome, CompareAndSwapOutcome::Updated)).count();

	assert_eq!(successes, 1, "only one CAS should succeed");

	let final_session = store.snapshot().expect("Final session should remain present.");

	assert!(final_session.has_access_token("access-a") || final_session.has_access_token("access-b"));
}

#[tokio::test]
async fn clones_share_the_same_slot() {
	let store = MemoryStore::default();
	let shared: Arc<dyn SessionStore> = Arc::new(store.clone());

	shared
		.save(build_session("access-shared", None))
		.await
		.expect("Saving through the trait object should succeed.");

	assert!(store.snapshot().is_some_and(|session| session.has_access_token("access-shared")));

	store.clear().await.expect("Clearing through the concrete store should succeed.");

	assert!(shared.load().await.expect("Loading through the trait object should succeed.").is_none());
}
