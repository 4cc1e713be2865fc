//! Single-flight credential refresh with compare-and-swap rotation.
//!
//! Concurrent `401`s must cost the backend one refresh call. Callers serialize on the gateway's
//! refresh guard and re-read the store once they hold it: if the stored access credential is no
//! longer the one the backend rejected, another caller already rotated the pair and it is reused
//! as-is. Otherwise the holder exchanges the refresh credential and writes the new pair with
//! [`SessionStore::compare_and_swap`](crate::store::SessionStore::compare_and_swap) so a stale
//! result can never overwrite a newer session.

// self
use super::{Gateway, SessionEvent, record_result};
use crate::{
	_prelude::*,
	api::{ApiRequest, ApiResponse},
	auth::{SessionCredentials, TokenPair, TokenSecret},
	config::RefreshCredentialPlacement,
	error::AuthFailure,
	http::{ApiHttpClient, HttpRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::CompareAndSwapOutcome,
};

const KIND: CallKind = CallKind::Refresh;

/// State guarded by the single-flight refresh lock.
#[derive(Debug, Default)]
pub(crate) struct RefreshState {
	/// Access credential of the last session a refresh ended, and why it ended.
	ended: Option<(TokenSecret, AuthFailure)>,
}
impl RefreshState {
	/// Reason reported to a caller whose session is already gone.
	fn failure_for(&self, rejected_access: &str) -> AuthFailure {
		match &self.ended {
			Some((access, reason)) if access.matches(rejected_access) => *reason,
			_ => AuthFailure::MissingSession,
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Rotates the stored pair now, regardless of whether the access credential was rejected.
	///
	/// Shares the single-flight guard with the automatic refresh performed by [`Gateway::send`].
	/// Terminal failures clear the store and emit [`SessionEvent::Invalidated`].
	pub async fn refresh_session(&self) -> Result<SessionCredentials> {
		let session = self.current_session(KIND).await?;

		self.refresh_after(session.access_token.expose()).await
	}

	/// Refreshes the pair whose access credential `rejected_access` was turned down, or joins a
	/// refresh that already replaced it.
	pub(crate) async fn refresh_after(&self, rejected_access: &str) -> Result<SessionCredentials> {
		let span = CallSpan::new(KIND, "refresh_after");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.refresh_locked(rejected_access)).await;

		record_result(KIND, &span, &result);

		result
	}

	async fn refresh_locked(&self, rejected_access: &str) -> Result<SessionCredentials> {
		let mut state = self.refresh_guard.lock().await;
		// A failed refresh ahead of us already cleared the store and announced it.
		let Some(current) = self.store.load().await? else {
			return Err(Error::AuthFailed { reason: state.failure_for(rejected_access) });
		};

		if !current.has_access_token(rejected_access) {
			self.metrics.record_refresh_coalesced();
			obs::refresh_coalesced();
			obs::record_refresh_coalesced();

			return Ok(current);
		}

		let Some(refresh) = current.refresh_token.clone() else {
			return Err(self.end_session(&mut state, &current, AuthFailure::MissingRefreshToken).await);
		};

		self.metrics.record_refresh_attempt();

		let rotated = match self.request_rotation(&refresh).await.and_then(|issued| {
			current.rotate(issued).ok_or(AuthFailure::RefreshMalformed)
		}) {
			Ok(rotated) => rotated,
			Err(reason) => {
				self.metrics.record_refresh_failure();

				return Err(self.end_session(&mut state, &current, reason).await);
			},
		};
		// The backend has already consumed the old refresh credential, so a pair that cannot be
		// written leaves nothing usable behind.
		let outcome = match self.store.compare_and_swap(rejected_access, rotated.clone()).await {
			Ok(outcome) => outcome,
			Err(e) => {
				obs::call_failed(KIND, &e);
				self.metrics.record_refresh_failure();

				return Err(
					self.end_session(&mut state, &current, AuthFailure::RotationUnsaved).await
				);
			},
		};
		let session = match outcome {
			CompareAndSwapOutcome::Updated => rotated,
			// A sign-in replaced the session while the exchange was in flight; it wins.
			CompareAndSwapOutcome::Mismatch => match self.store.load().await? {
				Some(existing) => return Ok(existing),
				None => return Err(Error::AuthFailed { reason: AuthFailure::MissingSession }),
			},
			// Signed out mid-flight; do not resurrect the session.
			CompareAndSwapOutcome::Missing =>
				return Err(Error::AuthFailed { reason: AuthFailure::MissingSession }),
		};

		state.ended = None;
		self.metrics.record_refresh_success();
		self.emit(&SessionEvent::Refreshed);

		Ok(session)
	}

	/// Invalidates the session and remembers why, so queued callers report the same reason.
	async fn end_session(
		&self,
		state: &mut RefreshState,
		current: &SessionCredentials,
		reason: AuthFailure,
	) -> Error {
		state.ended = Some((current.access_token.clone(), reason));

		self.invalidate(KIND, reason).await
	}

	/// Calls the refresh endpoint and decodes the issued pair.
	async fn request_rotation(&self, refresh: &TokenSecret) -> Result<TokenPair, AuthFailure> {
		let request = self.rotation_request(refresh).map_err(|e| {
			obs::call_failed(KIND, &e);

			AuthFailure::RefreshMalformed
		})?;
		let response = match self.http_client.call(request).await {
			Ok(response) => ApiResponse::from(response),
			Err(e) => {
				obs::call_failed(KIND, &e);

				return Err(AuthFailure::RefreshTransport);
			},
		};

		if !response.is_success() {
			return Err(AuthFailure::RefreshRejected { status: response.status.as_u16() });
		}

		response.json_or_data::<TokenPair>().map_err(|e| {
			obs::call_failed(KIND, &e);

			AuthFailure::RefreshMalformed
		})
	}

	fn rotation_request(&self, refresh: &TokenSecret) -> Result<HttpRequest> {
		let request = ApiRequest::post(&self.config.endpoints.refresh);
		let http = match self.config.refresh_placement {
			RefreshCredentialPlacement::Body => request
				.json(&RefreshBody { refresh_token: refresh.expose() })?
				.to_http(&self.config, None)?,
			RefreshCredentialPlacement::BearerHeader =>
				request.to_http(&self.config, Some(&refresh.bearer()))?,
		};

		Ok(http)
	}
}
