//! Authenticated REST client for admin panels: bearer sessions with single-flight token refresh,
//! one-shot request replay, and pluggable session stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::SessionCredentials,
		config::GatewayConfig,
		gateway::ReqwestGateway,
		http::ReqwestHttpClient,
		store::{MemoryStore, SessionStore},
	};

	/// Builds a gateway config that points at a local mock backend.
	pub fn test_config(base_url: &str) -> GatewayConfig {
		GatewayConfig::builder(
			Url::parse(base_url).expect("Mock backend base URL should parse successfully."),
		)
		.build()
		.expect("Loopback gateway config should pass validation.")
	}

	/// Constructs a [`ReqwestGateway`] backed by an in-memory store and the default reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_gateway(base_url: &str) -> (ReqwestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let http_client = ReqwestHttpClient::new()
			.expect("Failed to build redirect-free Reqwest client for tests.");
		let gateway = ReqwestGateway::with_http_client(test_config(base_url), store, http_client);

		(gateway, store_backend)
	}

	/// Seeds the store with an access/refresh pair.
	pub async fn seed_session(store: &MemoryStore, access: &str, refresh: Option<&str>) {
		let mut credentials = SessionCredentials::new(access);

		if let Some(refresh) = refresh {
			credentials = credentials.with_refresh_token(refresh);
		}

		store.save(credentials).await.expect("Failed to seed session credentials into the store.");
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
