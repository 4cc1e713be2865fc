//! Demonstrates signing in, listing orders across an access-token expiry, and signing out with
//! the default reqwest transport and a file-backed session store.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use url::Url;
// self
use session_gateway::{
	api::Envelope,
	auth::Role,
	config::GatewayConfig,
	gateway::{LoginRequest, ReqwestGateway, SessionEvent},
	store::{FileStore, SessionStore},
};

#[derive(Debug, Deserialize)]
struct Order {
	id: u32,
	status: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"demo-access-1\",\"refreshToken\":\"demo-refresh-1\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":1,\"name\":\"Demo Admin\",\"role\":\"admin\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access-1");
			then.status(401);
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"demo-access-2\",\"refreshToken\":\"demo-refresh-2\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"id\":11,\"status\":\"pending\"},{\"id\":12,\"status\":\"delivered\"}]}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/logout");
			then.status(204);
		})
		.await;

	let path = std::env::temp_dir().join("session-gateway-demo.json");
	let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(&path)?);
	let config = GatewayConfig::builder(Url::parse(&server.base_url())?).build()?;
	let gateway = ReqwestGateway::new(config, store)?;

	gateway.subscribe(|event: &SessionEvent| {
		if let SessionEvent::Invalidated { sign_in, .. } = event {
			println!("Session ended; redirect to {sign_in}.");
		} else {
			println!("Session event: {event:?}.");
		}
	});
	gateway.sign_in(&LoginRequest::new("admin@example.com", "demo-password")).await?;

	let me = gateway.authorize(&[Role::Admin, Role::Manager]).await?;

	println!("Signed in as {} ({}).", me.name, me.role);

	let orders = gateway.get_json::<Envelope<Vec<Order>>>("/orders").await?;

	for order in &orders.data {
		println!("Order #{}: {}.", order.id, order.status);
	}

	gateway.sign_out().await?;

	login_mock.assert_async().await;
	refresh_mock.assert_async().await;

	Ok(())
}
