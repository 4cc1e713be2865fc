//! Authenticated request gateway with one-shot refresh-and-replay.
//!
//! Every authorized call attaches the stored access credential. A `401` marks the credential as
//! expired: the gateway performs (or joins) a single refresh, replays the original request once
//! with the rotated credential, and gives up after that. Terminal failures clear the store and
//! emit [`SessionEvent::Invalidated`] so the hosting application can route to its sign-in page.

pub mod events;
pub mod refresh;
pub mod session;

mod metrics;

pub use events::*;
pub use metrics::GatewayMetrics;
pub use session::LoginRequest;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{ApiRequest, ApiResponse},
	auth::{SessionCredentials, TokenSecret},
	config::GatewayConfig,
	error::AuthFailure,
	http::{ApiHttpClient, StatusCode},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Outcome of a single authorized dispatch.
enum Dispatch {
	/// Any status other than 401.
	Completed(ApiResponse),
	/// The access credential was rejected.
	Rejected,
}

/// Owns the transport, session store, and configuration for one authenticated session.
///
/// Clones share the store, listeners, metrics, and the single-flight refresh guard, so a gateway
/// can be handed to concurrent tasks freely.
pub struct Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client used for every outbound backend request.
	pub http_client: Arc<C>,
	/// Store holding the session's credential pair.
	pub store: Arc<dyn SessionStore>,
	/// Validated backend configuration.
	pub config: Arc<GatewayConfig>,
	/// Shared counters for requests, retries, and refreshes.
	pub metrics: Arc<GatewayMetrics>,
	listeners: Arc<RwLock<Vec<Arc<dyn SessionListener>>>>,
	refresh_guard: Arc<AsyncMutex<refresh::RefreshState>>,
}
impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_http_client(
		config: GatewayConfig,
		store: Arc<dyn SessionStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			config: Arc::new(config),
			metrics: Default::default(),
			listeners: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Absolute sign-in location announced when the session is invalidated.
	pub fn sign_in_url(&self) -> Url {
		self.config.sign_in_url()
	}

	/// Registers a listener for session lifecycle events.
	pub fn subscribe<L>(&self, listener: L)
	where
		L: 'static + SessionListener,
	{
		self.listeners.write().push(Arc::new(listener));
	}

	/// Sends an authorized request, refreshing and replaying it once on `401`.
	///
	/// Every status other than `401` is returned unchanged. A second `401` after a successful
	/// refresh is terminal: the store is cleared and [`Error::AuthFailed`] is returned.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.send_with_refresh(request)).await;

		record_result(KIND, &span, &result);

		result
	}

	/// Sends an authorized request exactly once; `401` surfaces as [`Error::AuthExpired`].
	pub async fn send_once(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send_once");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.current_session(KIND).await?;

				match self.dispatch(&request, &session.access_token).await? {
					Dispatch::Completed(response) => Ok(response),
					Dispatch::Rejected => Err(Error::AuthExpired),
				}
			})
			.await;

		record_result(KIND, &span, &result);

		result
	}

	/// `GET` a JSON resource; non-2xx statuses become [`Error::Api`].
	pub async fn get_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(ApiRequest::get(path)).await?.error_for_status()?.json()
	}

	/// `POST` a JSON body and decode the JSON answer.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send(ApiRequest::post(path).json(body)?).await?.error_for_status()?.json()
	}

	/// `PUT` a JSON body and decode the JSON answer.
	pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send(ApiRequest::put(path).json(body)?).await?.error_for_status()?.json()
	}

	/// `PATCH` a JSON body and decode the JSON answer.
	pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send(ApiRequest::patch(path).json(body)?).await?.error_for_status()?.json()
	}

	/// `DELETE` a resource; non-2xx statuses become [`Error::Api`].
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.send(ApiRequest::delete(path)).await?.error_for_status()
	}

	async fn send_with_refresh(&self, request: ApiRequest) -> Result<ApiResponse> {
		let session = self.current_session(CallKind::Request).await?;

		if let Dispatch::Completed(response) =
			self.dispatch(&request, &session.access_token).await?
		{
			return Ok(response);
		}

		let refreshed = self.refresh_after(session.access_token.expose()).await?;

		self.metrics.record_retry();

		match self.dispatch(&request, &refreshed.access_token).await? {
			Dispatch::Completed(response) => Ok(response),
			Dispatch::Rejected =>
				Err(self.invalidate(CallKind::Request, AuthFailure::RetryRejected).await),
		}
	}

	async fn dispatch(&self, request: &ApiRequest, access: &TokenSecret) -> Result<Dispatch> {
		let http = request.to_http(&self.config, Some(&access.bearer()))?;

		self.metrics.record_request();

		let response = ApiResponse::from(self.http_client.call(http).await?);

		if response.status == StatusCode::UNAUTHORIZED {
			Ok(Dispatch::Rejected)
		} else {
			Ok(Dispatch::Completed(response))
		}
	}

	async fn current_session(&self, kind: CallKind) -> Result<SessionCredentials> {
		match self.store.load().await? {
			Some(session) => Ok(session),
			None => Err(self.invalidate(kind, AuthFailure::MissingSession).await),
		}
	}

	/// Clears the store, announces the invalidation, and returns the terminal error.
	async fn invalidate(&self, kind: CallKind, reason: AuthFailure) -> Error {
		if let Err(e) = self.store.clear().await {
			obs::call_failed(kind, &e);
		}

		obs::session_invalidated(reason);
		obs::record_session_invalidated(reason);
		self.emit(&SessionEvent::Invalidated { reason, sign_in: self.sign_in_url() });

		Error::AuthFailed { reason }
	}

	fn emit(&self, event: &SessionEvent) {
		let listeners = self.listeners.read().clone();

		for listener in listeners {
			listener.on_session_event(event);
		}
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a new gateway that provisions its own redirect-free reqwest transport.
	pub fn new(config: GatewayConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
		Ok(Self::with_http_client(config, store, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			metrics: self.metrics.clone(),
			listeners: self.listeners.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("config", &self.config)
			.field("metrics", &self.metrics)
			.field("listeners", &self.listeners.read().len())
			.finish()
	}
}

fn record_result<T>(kind: CallKind, span: &CallSpan, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
		Err(e) => {
			span.record_failure(e);
			obs::record_call_failure(kind, e);
		},
	}
}
