//! Redacting wrapper for access and refresh credentials.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Opaque credential string that never prints its value.
///
/// The raw value is reachable only through [`TokenSecret::expose`] and
/// [`TokenSecret::bearer`]; `Debug` and `Display` both render a placeholder.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw credential. Do not log it.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `Authorization` header value carrying this credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}

	/// Returns `true` if the wrapped value equals `candidate`.
	pub fn matches(&self, candidate: &str) -> bool {
		self.0 == candidate
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatting_never_leaks_the_value() {
		let secret = TokenSecret::new("eyJhbGciOi.payload.sig");

		assert_eq!(format!("{secret:?}"), "TokenSecret(<redacted>)");
		assert_eq!(secret.to_string(), "<redacted>");
		assert_eq!(secret.bearer(), "Bearer eyJhbGciOi.payload.sig");
		assert!(secret.matches("eyJhbGciOi.payload.sig"));
	}

	#[test]
	fn serializes_as_a_bare_string() {
		let secret = TokenSecret::from(String::from("ref1"));

		assert_eq!(serde_json::to_string(&secret).expect("Secret should serialize."), "\"ref1\"");
	}
}
