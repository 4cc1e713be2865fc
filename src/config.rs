//! Gateway configuration: backend location, auth endpoint paths, and sign-in redirect.
//!
//! Configuration is assembled through [`GatewayConfigBuilder`] or deserialized from JSON with
//! [`GatewayConfig::from_json`]; both paths run the same validation.

// self
use crate::{_prelude::*, error::ConfigError};

/// How the refresh credential travels to the refresh endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshCredentialPlacement {
	/// JSON body `{"refreshToken": "..."}`.
	#[default]
	Body,
	/// `Authorization: Bearer <refresh>` header with an empty body.
	BearerHeader,
}

/// Auth endpoint paths, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEndpoints {
	/// Identity lookup (`GET`).
	pub identity: String,
	/// Credential refresh (`POST`).
	pub refresh: String,
	/// Best-effort logout (`POST`).
	pub logout: String,
	/// Credential login (`POST`).
	pub login: String,
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			identity: "/auth/me".into(),
			refresh: "/auth/refresh".into(),
			logout: "/auth/logout".into(),
			login: "/auth/login".into(),
		}
	}
}

/// Errors raised while constructing or validating a [`GatewayConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum GatewayConfigError {
	/// Base URL must use HTTPS unless it targets a loopback host.
	#[error("The base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a path (e.g. `mailto:`).
	#[error("The base URL cannot be used for HTTP requests: {url}.")]
	UnsupportedBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint paths must be absolute.
	#[error("The {endpoint} path must start with `/`: {path}.")]
	RelativePath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Endpoint paths must stay on the base URL's origin.
	#[error("The {endpoint} path does not resolve onto the base URL: {path}.")]
	ForeignEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// JSON configuration could not be parsed.
	#[error("Gateway configuration is not valid JSON: {message}.")]
	Parse {
		/// Parser message including the failing path.
		message: String,
	},
}

/// Validated configuration consumed by the gateway.
///
/// Deserialization goes through [`GatewayConfigBuilder`], so it runs the same validation as
/// [`GatewayConfigBuilder::build`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GatewayConfigBuilder")]
pub struct GatewayConfig {
	/// Backend origin every request path is joined onto.
	pub base_url: Url,
	/// Auth endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Sign-in entry point announced when the session is invalidated.
	pub sign_in: String,
	/// Where the refresh credential is placed on refresh calls.
	pub refresh_placement: RefreshCredentialPlacement,
	/// Permits plain HTTP against non-loopback hosts.
	pub allow_insecure: bool,
}
impl GatewayConfig {
	/// Creates a new builder for the provided backend base URL.
	pub fn builder(base_url: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(base_url)
	}

	/// Parses and validates a JSON configuration document.
	///
	/// Only `base_url` is required; everything else falls back to the builder defaults.
	pub fn from_json(raw: &str) -> Result<Self, GatewayConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let builder: GatewayConfigBuilder = serde_path_to_error::deserialize(de)
			.map_err(|e| GatewayConfigError::Parse { message: e.to_string() })?;

		builder.build()
	}

	/// Resolves a request path against the base URL.
	///
	/// Leading slashes are kept relative to the base path, so a base of
	/// `https://api.example.com/v1/` and a path of `/orders` yields `.../v1/orders`. Paths that
	/// carry their own scheme or otherwise land on another origin are rejected; the bearer
	/// credential only ever travels to the configured backend.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let relative = path.trim_start_matches('/');

		if Url::parse(relative).is_ok() {
			return Err(ConfigError::ForeignPath { path: path.to_owned() });
		}

		let mut base = self.base_url.clone();

		if !base.path().ends_with('/') {
			let with_slash = format!("{}/", base.path());

			base.set_path(&with_slash);
		}

		let url = base
			.join(relative)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;

		if url.origin() != self.base_url.origin() {
			return Err(ConfigError::ForeignPath { path: path.to_owned() });
		}

		Ok(url)
	}

	/// Absolute sign-in URL announced on invalidation.
	pub fn sign_in_url(&self) -> Url {
		self.resolve(&self.sign_in).unwrap_or_else(|_| self.base_url.clone())
	}

	fn validate(&self) -> Result<(), GatewayConfigError> {
		if self.base_url.cannot_be_a_base() {
			return Err(GatewayConfigError::UnsupportedBaseUrl { url: self.base_url.to_string() });
		}

		match self.base_url.scheme() {
			"https" => (),
			"http" if self.allow_insecure || is_loopback(&self.base_url) => (),
			"http" =>
				return Err(GatewayConfigError::InsecureBaseUrl { url: self.base_url.to_string() }),
			_ =>
				return Err(GatewayConfigError::UnsupportedBaseUrl {
					url: self.base_url.to_string(),
				}),
		}

		for (endpoint, path) in [
			("identity", &self.endpoints.identity),
			("refresh", &self.endpoints.refresh),
			("logout", &self.endpoints.logout),
			("login", &self.endpoints.login),
			("sign-in", &self.sign_in),
		] {
			validate_path(endpoint, path)?;

			if self.resolve(path).is_err() {
				return Err(GatewayConfigError::ForeignEndpoint { endpoint, path: path.clone() });
			}
		}

		Ok(())
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Debug, Deserialize)]
pub struct GatewayConfigBuilder {
	/// Backend origin.
	pub base_url: Url,
	/// Auth endpoint paths.
	#[serde(default)]
	pub endpoints: AuthEndpoints,
	/// Sign-in entry point.
	#[serde(default = "default_sign_in")]
	pub sign_in: String,
	/// Refresh credential placement.
	#[serde(default)]
	pub refresh_placement: RefreshCredentialPlacement,
	/// Permits plain HTTP against non-loopback hosts.
	#[serde(default)]
	pub allow_insecure: bool,
}
impl GatewayConfigBuilder {
	/// Creates a new builder seeded with defaults for every auth endpoint.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			endpoints: AuthEndpoints::default(),
			sign_in: default_sign_in(),
			refresh_placement: RefreshCredentialPlacement::default(),
			allow_insecure: false,
		}
	}

	/// Overrides the identity endpoint path.
	pub fn identity_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.identity = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.logout = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.login = path.into();

		self
	}

	/// Overrides the sign-in entry point.
	pub fn sign_in(mut self, path: impl Into<String>) -> Self {
		self.sign_in = path.into();

		self
	}

	/// Overrides where the refresh credential is sent.
	pub fn refresh_placement(mut self, placement: RefreshCredentialPlacement) -> Self {
		self.refresh_placement = placement;

		self
	}

	/// Allows plain HTTP against non-loopback hosts.
	pub fn allow_insecure(mut self, allow: bool) -> Self {
		self.allow_insecure = allow;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<GatewayConfig, GatewayConfigError> {
		let config = GatewayConfig {
			base_url: self.base_url,
			endpoints: self.endpoints,
			sign_in: self.sign_in,
			refresh_placement: self.refresh_placement,
			allow_insecure: self.allow_insecure,
		};

		config.validate()?;

		Ok(config)
	}
}

impl TryFrom<GatewayConfigBuilder> for GatewayConfig {
	type Error = GatewayConfigError;

	fn try_from(builder: GatewayConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

fn default_sign_in() -> String {
	"/sign-in".into()
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), GatewayConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(GatewayConfigError::RelativePath { endpoint, path: path.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse config fixture URL.")
	}

	#[test]
	fn insecure_hosts_require_opt_in() {
		let err = GatewayConfig::builder(url("http://panel.example.com"))
			.build()
			.expect_err("Plain HTTP against a public host must be rejected.");

		assert!(matches!(err, GatewayConfigError::InsecureBaseUrl { .. }));

		GatewayConfig::builder(url("http://127.0.0.1:8080"))
			.build()
			.expect("Loopback hosts may use plain HTTP.");
		GatewayConfig::builder(url("http://panel.internal"))
			.allow_insecure(true)
			.build()
			.expect("Explicit opt-in should permit plain HTTP.");
	}

	#[test]
	fn endpoint_paths_must_be_absolute() {
		let err = GatewayConfig::builder(url("https://api.example.com"))
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Relative refresh path must be rejected.");

		assert_eq!(
			err,
			GatewayConfigError::RelativePath { endpoint: "refresh", path: "auth/refresh".into() }
		);
	}

	#[test]
	fn resolve_keeps_base_path_prefix() {
		let config = GatewayConfig::builder(url("https://api.example.com/v1"))
			.build()
			.expect("HTTPS config should validate.");

		assert_eq!(
			config.resolve("/orders").expect("Path should resolve.").as_str(),
			"https://api.example.com/v1/orders"
		);
		assert_eq!(config.sign_in_url().as_str(), "https://api.example.com/v1/sign-in");
	}

	#[test]
	fn foreign_paths_are_rejected() {
		let config = GatewayConfig::builder(url("https://api.example.com/v1/"))
			.build()
			.expect("HTTPS config should validate.");

		assert!(matches!(
			config.resolve("https://evil.example/collect"),
			Err(ConfigError::ForeignPath { .. })
		));
		assert_eq!(
			config.resolve("//evil.example/collect").expect("Leading slashes stay on the base path.").as_str(),
			"https://api.example.com/v1/evil.example/collect"
		);
		assert_eq!(
			config.resolve("/orders/../stores").expect("Same-origin paths resolve.").as_str(),
			"https://api.example.com/v1/stores"
		);

		let err = GatewayConfig::builder(url("https://api.example.com"))
			.refresh_path("/https://evil.example/refresh")
			.build()
			.expect_err("A refresh endpoint on another host must be rejected.");

		assert_eq!(
			err,
			GatewayConfigError::ForeignEndpoint {
				endpoint: "refresh",
				path: "/https://evil.example/refresh".into(),
			}
		);
	}

	#[test]
	fn deserializing_a_config_runs_validation() {
		serde_json::from_str::<GatewayConfig>(r#"{"base_url":"http://panel.example.com"}"#)
			.expect_err("Direct deserialization must not bypass HTTPS enforcement.");

		let config = serde_json::from_str::<GatewayConfig>(r#"{"base_url":"https://api.example.com"}"#)
			.expect("A valid config should deserialize.");

		assert_eq!(config.sign_in, "/sign-in");
	}

	#[test]
	fn json_config_falls_back_to_defaults() {
		let config = GatewayConfig::from_json(
			r#"{"base_url":"https://api.example.com","refresh_placement":"bearer_header","endpoints":{"identity":"/users/me"}}"#,
		)
		.expect("Partial JSON config should parse.");

		assert_eq!(config.endpoints.identity, "/users/me");
		assert_eq!(config.endpoints.refresh, "/auth/refresh");
		assert_eq!(config.sign_in, "/sign-in");
		assert_eq!(config.refresh_placement, RefreshCredentialPlacement::BearerHeader);

		let err = GatewayConfig::from_json(r#"{"base_url":42}"#)
			.expect_err("A numeric base URL must be rejected.");

		assert!(matches!(err, GatewayConfigError::Parse { message } if message.contains("base_url")));
	}
}
