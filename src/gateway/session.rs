//! Session lifecycle endpoints: login, identity lookup, and logout.

// self
use super::{Gateway, SessionEvent, record_result};
use crate::{
	_prelude::*,
	api::{ApiRequest, ApiResponse},
	auth::{Identity, Role, SessionCredentials, TokenPair},
	error::DecodeError,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Credentials submitted to the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
	/// Login name or e-mail.
	pub login: String,
	/// Plain-text password, sent once over TLS and never stored.
	pub password: String,
}
impl LoginRequest {
	/// Creates a login request.
	pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
		Self { login: login.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("login", &self.login)
			.field("password", &"<redacted>")
			.finish()
	}
}

impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Exchanges login credentials for a session and stores the issued pair.
	///
	/// The login call carries no bearer credential and is never refreshed or replayed; a
	/// rejection surfaces as [`Error::Api`].
	pub async fn sign_in(&self, login: &LoginRequest) -> Result<SessionCredentials> {
		const KIND: CallKind = CallKind::SignIn;

		let span = CallSpan::new(KIND, "sign_in");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(&self.config.endpoints.login)
					.json(login)?
					.to_http(&self.config, None)?;
				let response =
					ApiResponse::from(self.http_client.call(request).await?).error_for_status()?;
				let status = response.status.as_u16();
				let credentials = response
					.json_or_data::<TokenPair>()?
					.into_credentials()
					.ok_or(DecodeError::MissingAccessToken { status })?;

				self.store.save(credentials.clone()).await?;
				self.emit(&SessionEvent::SignedIn);

				Ok(credentials)
			})
			.await;

		record_result(KIND, &span, &result);

		result
	}

	/// Fetches the signed-in user, refreshing once if the access credential expired.
	pub async fn identity(&self) -> Result<Identity> {
		const KIND: CallKind = CallKind::Identity;

		let span = CallSpan::new(KIND, "identity");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.send_with_refresh(ApiRequest::get(&self.config.endpoints.identity))
					.await?
					.error_for_status()?
					.json_or_data::<Identity>()
			})
			.await;

		record_result(KIND, &span, &result);

		result
	}

	/// Fetches the signed-in user and checks that their role is one of `allowed`.
	///
	/// An empty `allowed` list admits every role.
	pub async fn authorize(&self, allowed: &[Role]) -> Result<Identity> {
		let identity = self.identity().await?;

		identity.require_role(allowed)?;

		Ok(identity)
	}

	/// Ends the session.
	///
	/// The logout call is best-effort: its failures are logged and ignored, and the local pair is
	/// cleared regardless. Signing out without a session is a no-op apart from the event.
	pub async fn sign_out(&self) -> Result<()> {
		const KIND: CallKind = CallKind::SignOut;

		let span = CallSpan::new(KIND, "sign_out");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(session) = self.store.load().await? {
					self.notify_logout(&session).await;
				}

				self.store.clear().await?;
				self.emit(&SessionEvent::SignedOut);

				Ok(())
			})
			.await;

		record_result(KIND, &span, &result);

		result
	}

	async fn notify_logout(&self, session: &SessionCredentials) {
		const KIND: CallKind = CallKind::SignOut;

		let outcome: Result<ApiResponse> = async {
			let request = ApiRequest::post(&self.config.endpoints.logout)
				.to_http(&self.config, Some(&session.access_token.bearer()))?;

			ApiResponse::from(self.http_client.call(request).await?).error_for_status()
		}
		.await;

		if let Err(e) = outcome {
			obs::call_failed(KIND, &e);
		}
	}
}
