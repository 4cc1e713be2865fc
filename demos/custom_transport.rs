//! Demonstrates plugging an in-process transport into the gateway.
//!
//! 1. Implement [`ApiHttpClient`] over plain `http` requests and buffered responses.
//! 2. Pass the transport to [`Gateway::with_http_client`].
//! 3. Watch the gateway refresh and replay once the fake backend expires the first access token.

// std
use std::sync::{
	Arc,
	atomic::{AtomicU32, Ordering},
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use session_gateway::{
	auth::SessionCredentials,
	config::GatewayConfig,
	error::TransportError,
	gateway::{Gateway, SessionEvent},
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse, StatusCode, header},
	store::{MemoryStore, SessionStore},
};

/// Backend double that rejects `tok1` and issues `tok2` on refresh.
#[derive(Debug, Default)]
struct FakeBackend {
	refreshes: AtomicU32,
}
impl FakeBackend {
	fn respond(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		let bearer = request
			.headers()
			.get(header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default();
		let (status, body) = match request.uri().path() {
			"/auth/refresh" => {
				self.refreshes.fetch_add(1, Ordering::Relaxed);

				(StatusCode::OK, r#"{"accessToken":"tok2","refreshToken":"ref2"}"#)
			},
			"/orders" if bearer == "Bearer tok2" =>
				(StatusCode::OK, r#"{"data":[{"id":1,"status":"pending"}]}"#),
			_ => (StatusCode::UNAUTHORIZED, r#"{"message":"Token expired"}"#),
		};

		::http::Response::builder()
			.status(status)
			.header(header::CONTENT_TYPE, "application/json")
			.body(body.as_bytes().to_vec())
			.map_err(TransportError::network)
	}
}
impl ApiHttpClient for FakeBackend {
	fn call(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move { self.respond(&request) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = Arc::new(MemoryStore::with_credentials(
		SessionCredentials::new("tok1").with_refresh_token("ref1"),
	));
	let config = GatewayConfig::builder(Url::parse("https://api.example.com/")?).build()?;
	let backend = Arc::new(FakeBackend::default());
	let gateway: Gateway<FakeBackend> =
		Gateway::with_http_client(config, store.clone() as Arc<dyn SessionStore>, backend.clone());

	gateway.subscribe(|event: &SessionEvent| println!("session event: {event:?}"));

	let orders: serde_json::Value = gateway.get_json("/orders").await?;

	println!("orders: {orders}");
	println!("refresh calls: {}", backend.refreshes.load(Ordering::Relaxed));
	println!("stored session: {:?}", store.snapshot());

	Ok(())
}
