//! Transport primitives for backend calls.
//!
//! [`ApiHttpClient`] is the gateway's only dependency on an HTTP stack. It speaks plain
//! [`http`](::http) request/response types with buffered bodies so custom transports (test
//! doubles, WASM fetch bridges, proxies) can be plugged in without pulling in reqwest.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::TransportError};

pub use ::http::{HeaderMap, HeaderValue, Method, StatusCode, header};

/// Buffered request handed to a transport.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Buffered response returned by a transport.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiHttpClient::call`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing backend calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared across
/// gateway clones, and must hand back every response (including 3xx/4xx/5xx) instead of turning
/// statuses into errors; only failures that produced no response belong in [`TransportError`].
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response body.
	fn call(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are returned to the caller rather than followed: a backend that answers an expired
/// session with a redirect to its login page must not have that hidden behind a `200`.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with redirect following disabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// Configure the client with [`Policy::none`] to keep 401 handling intact.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn call(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let version = response.version();
			let body = response.bytes().await?.to_vec();
			let mut buffered = HttpResponse::new(body);

			*buffered.status_mut() = status;
			*buffered.headers_mut() = headers;
			*buffered.version_mut() = version;

			Ok(buffered)
		})
	}
}
