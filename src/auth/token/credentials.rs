//! Session credential pair and its wire representation.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Access/refresh pair owned by a single session.
///
/// The pair is replaced wholesale on rotation; individual secrets are never patched in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
	/// Short-lived bearer credential attached to every request.
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for a new pair, if the backend issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the pair was stored locally.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
}
impl SessionCredentials {
	/// Creates a pair holding only an access credential.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Attaches a refresh credential.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Overrides the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Returns `true` if this pair still carries the provided access credential.
	pub fn has_access_token(&self, access: &str) -> bool {
		self.access_token.matches(access)
	}

	/// Builds the pair that replaces `self` after a refresh.
	///
	/// Backends that do not rotate the refresh credential omit it; the previous one is kept.
	pub fn rotate(&self, issued: TokenPair) -> Option<Self> {
		let mut next = issued.into_credentials()?;

		if next.refresh_token.is_none() {
			next.refresh_token = self.refresh_token.clone();
		}

		Some(next)
	}
}
impl Debug for SessionCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionCredentials")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Credential pair as returned by the login and refresh endpoints.
///
/// Accepts camelCase, snake_case, and short (`access` / `refresh`) field names.
#[derive(Clone, Default, Deserialize)]
pub struct TokenPair {
	/// Newly issued access credential.
	#[serde(default, rename = "accessToken", alias = "access_token", alias = "access")]
	pub access_token: Option<String>,
	/// Newly issued refresh credential, if rotated.
	#[serde(default, rename = "refreshToken", alias = "refresh_token", alias = "refresh")]
	pub refresh_token: Option<String>,
}
impl TokenPair {
	/// Converts a login response into a fresh session.
	pub fn into_credentials(self) -> Option<SessionCredentials> {
		let access = self.access_token.filter(|value| !value.is_empty())?;
		let credentials = SessionCredentials::new(access);

		match self.refresh_token.filter(|value| !value.is_empty()) {
			Some(refresh) => Some(credentials.with_refresh_token(refresh)),
			None => Some(credentials),
		}
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn pair(json: &str) -> TokenPair {
		serde_json::from_str(json).expect("Token pair fixture should deserialize.")
	}

	#[test]
	fn rotation_replaces_both_secrets() {
		let current = SessionCredentials::new("tok1").with_refresh_token("ref1");
		let rotated = current
			.rotate(pair(r#"{"accessToken":"tok2","refreshToken":"ref2"}"#))
			.expect("A pair with an access token should rotate.");

		assert!(rotated.has_access_token("tok2"));
		assert_eq!(rotated.refresh_token.as_ref().map(TokenSecret::expose), Some("ref2"));
	}

	#[test]
	fn rotation_keeps_refresh_secret_when_omitted() {
		let current = SessionCredentials::new("tok1").with_refresh_token("ref1");
		let rotated = current
			.rotate(pair(r#"{"access":"tok2"}"#))
			.expect("A pair with an access token should rotate.");

		assert!(rotated.has_access_token("tok2"));
		assert_eq!(rotated.refresh_token.as_ref().map(TokenSecret::expose), Some("ref1"));
	}

	#[test]
	fn rotation_rejects_missing_or_empty_access() {
		let current = SessionCredentials::new("tok1").with_refresh_token("ref1");

		assert!(current.rotate(pair(r#"{"refresh_token":"ref2"}"#)).is_none());
		assert!(current.rotate(pair(r#"{"access_token":"","refresh_token":"ref2"}"#)).is_none());
	}

	#[test]
	fn login_pair_without_refresh_yields_access_only_session() {
		let credentials = pair(r#"{"access_token":"tok1"}"#)
			.into_credentials()
			.expect("Login pair with an access token should convert.");

		assert!(credentials.has_access_token("tok1"));
		assert!(credentials.refresh_token.is_none());
	}

	#[test]
	fn debug_output_is_redacted_and_serde_round_trips_rfc3339() {
		let credentials = SessionCredentials::new("tok1")
			.with_refresh_token("ref1")
			.issued_at(macros::datetime!(2025-03-01 08:00 UTC));
		let rendered = format!("{credentials:?}");

		assert!(!rendered.contains("tok1"));
		assert!(!rendered.contains("ref1"));

		let json = serde_json::to_string(&credentials).expect("Credentials should serialize.");

		assert!(json.contains("\"issued_at\":\"2025-03-01T08:00:00Z\""));

		let back: SessionCredentials =
			serde_json::from_str(&json).expect("Credentials should deserialize.");

		assert_eq!(back, credentials);
	}
}
