//! Gateway-level error types shared across the session, transport, and store layers.

// self
use crate::{_prelude::*, auth::Role};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The access credential was rejected; a refresh may recover the session.
	#[error("Access credential was rejected by the backend.")]
	AuthExpired,
	/// The session is gone; the caller must send the user back to the sign-in page.
	#[error("Session is no longer authenticated: {reason}.")]
	AuthFailed {
		/// Why the session could not be recovered.
		reason: AuthFailure,
	},
	/// The backend answered with a non-success status other than 401.
	#[error("Backend returned {status}: {message}.")]
	Api {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Backend-supplied message, or the canonical reason phrase.
		message: String,
	},
	/// The authenticated identity lacks a permitted role.
	#[error("Role `{role}` is not allowed to perform this action.")]
	Forbidden {
		/// Role carried by the current identity.
		role: Role,
	},
}
impl Error {
	/// Returns a stable label for metric and span fields; auth failures report their reason.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Storage(_) => "storage",
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::Decode(_) => "decode",
			Self::AuthExpired => "auth_expired",
			Self::AuthFailed { reason } => reason.as_str(),
			Self::Api { .. } => "api",
			Self::Forbidden { .. } => "forbidden",
		}
	}

	/// Returns `true` when the caller must re-authenticate.
	pub fn is_unauthenticated(&self) -> bool {
		matches!(self, Self::AuthFailed { .. })
	}

	/// HTTP status associated with the error, if the backend produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::AuthExpired => Some(401),
			Self::Api { status, .. } => Some(*status),
			Self::AuthFailed { reason: AuthFailure::RefreshRejected { status } } => Some(*status),
			_ => None,
		}
	}
}

/// Terminal reasons attached to [`Error::AuthFailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AuthFailure {
	/// No credential pair is stored.
	MissingSession,
	/// The stored pair carries no refresh credential.
	MissingRefreshToken,
	/// The refresh endpoint answered with a non-success status.
	RefreshRejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// The refresh call failed at the transport layer.
	RefreshTransport,
	/// The refresh exchange could not be built or returned no usable access credential.
	RefreshMalformed,
	/// The backend rotated the pair but the store could not persist it.
	RotationUnsaved,
	/// The replayed request was rejected even with the refreshed credential.
	RetryRejected,
}
impl AuthFailure {
	/// Returns a stable label suitable for span, metric, or event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MissingSession => "missing_session",
			Self::MissingRefreshToken => "missing_refresh_token",
			Self::RefreshRejected { .. } => "refresh_rejected",
			Self::RefreshTransport => "refresh_transport",
			Self::RefreshMalformed => "refresh_malformed",
			Self::RotationUnsaved => "rotation_unsaved",
			Self::RetryRejected => "retry_rejected",
		}
	}
}
impl Display for AuthFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::MissingSession => f.write_str("no session credentials are stored"),
			Self::MissingRefreshToken => f.write_str("the session has no refresh credential"),
			Self::RefreshRejected { status } =>
				write!(f, "the refresh endpoint rejected the refresh credential with {status}"),
			Self::RefreshTransport => f.write_str("the refresh endpoint could not be reached"),
			Self::RefreshMalformed =>
				f.write_str("the refresh exchange produced no usable credential pair"),
			Self::RotationUnsaved => f.write_str("the rotated credential pair could not be stored"),
			Self::RetryRejected =>
				f.write_str("the backend rejected the request after a successful refresh"),
		}
	}
}

/// Configuration and request-construction failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Gateway configuration failed validation.
	#[error(transparent)]
	Gateway(#[from] crate::config::GatewayConfigError),
	/// A request path could not be joined onto the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request path resolves outside the configured backend.
	#[error("Request path `{path}` does not resolve onto the configured backend.")]
	ForeignPath {
		/// Offending request path.
		path: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON for the requested type.
	#[error("Response body from {status} is not valid JSON at `{path}`.")]
	Json {
		/// HTTP status of the decoded response.
		status: u16,
		/// JSON path where decoding failed.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Login response carried no access credential.
	#[error("Login response from {status} did not include an access token.")]
	MissingAccessToken {
		/// HTTP status of the login response.
		status: u16,
	},
}
impl DecodeError {
	pub(crate) fn json(status: u16, err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::Json { status, path, source: err.into_inner() }
	}
}
