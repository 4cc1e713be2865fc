//! Typed request/response surface for the backend's JSON endpoints.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::GatewayConfig,
	error::{ConfigError, DecodeError},
	http::{HeaderMap, HeaderValue, HttpRequest, HttpResponse, Method, StatusCode, header},
};

/// `{ "data": ... }` wrapper used by list and detail endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
	/// Wrapped payload.
	pub data: T,
}

/// Outbound backend request, resolved against the gateway's base URL at send time.
///
/// Requests are cheap to clone so the gateway can replay them after a refresh.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL, e.g. `/orders`.
	pub path: String,
	/// Query pairs appended in order.
	pub query: Vec<(String, String)>,
	/// Serialized JSON body.
	pub body: Option<Vec<u8>>,
	/// Extra headers; `Authorization` is always overwritten by the gateway.
	pub headers: HeaderMap,
}
impl ApiRequest {
	/// Creates a request with an arbitrary method.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			headers: HeaderMap::new(),
		}
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(ConfigError::Body)?);

		Ok(self)
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Builds the transport request, attaching `authorization` when provided.
	pub(crate) fn to_http(
		&self,
		config: &GatewayConfig,
		authorization: Option<&str>,
	) -> Result<HttpRequest, ConfigError> {
		let mut url = config.resolve(&self.path)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		let mut builder =
			::http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if let Some(headers) = builder.headers_mut() {
			headers.extend(self.headers.clone());
			headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

			if self.body.is_some() {
				headers
					.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
			}
			if let Some(value) = authorization {
				headers.insert(
					header::AUTHORIZATION,
					HeaderValue::try_from(value).map_err(::http::Error::from)?,
				);
			}
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}

/// Buffered backend response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body decoded as UTF-8, lossily.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as `T`, reporting the JSON path on failure.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|e| DecodeError::json(self.status.as_u16(), e).into())
	}

	/// Decodes a `{ "data": T }` body.
	pub fn data<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.json::<Envelope<T>>().map(|envelope| envelope.data)
	}

	/// Decodes `T` whether or not the backend wrapped it in `{ "data": ... }`.
	pub fn json_or_data<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		match self.json::<Envelope<T>>() {
			Ok(envelope) => Ok(envelope.data),
			Err(_) => self.json::<T>(),
		}
	}

	/// Converts non-2xx responses into [`Error::Api`], keeping status and backend message.
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Api { status: self.status.as_u16(), message: self.error_message() })
		}
	}

	/// Extracts the backend's `message` (string or list), falling back to the body text or
	/// the canonical reason phrase.
	pub fn error_message(&self) -> String {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Message {
			One(String),
			Many(Vec<String>),
		}
		#[derive(Deserialize)]
		struct ErrorBody {
			message: Option<Message>,
			error: Option<String>,
		}

		if let Ok(body) = serde_json::from_slice::<ErrorBody>(&self.body) {
			match (body.message, body.error) {
				(Some(Message::One(message)), _) if !message.is_empty() => return message,
				(Some(Message::Many(messages)), _) if !messages.is_empty() =>
					return messages.join("; "),
				(_, Some(error)) if !error.is_empty() => return error,
				_ => (),
			}
		}

		let text = self.text();
		let text = text.trim();

		if !text.is_empty() && !text.starts_with('{') {
			return text.to_owned();
		}

		self.status.canonical_reason().unwrap_or("Unknown status").to_owned()
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self { status: parts.status, headers: parts.headers, body }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse {
			status: StatusCode::from_u16(status).expect("Status fixture should be valid."),
			headers: HeaderMap::new(),
			body: body.as_bytes().to_vec(),
		}
	}

	fn config() -> GatewayConfig {
		GatewayConfig::builder(
			Url::parse("https://api.example.com/v1/").expect("Base URL fixture should parse."),
		)
		.build()
		.expect("Config fixture should validate.")
	}

	#[test]
	fn request_builds_authorized_json_call() {
		let request = ApiRequest::post("/orders")
			.query("page", 2)
			.query("status", "pending pickup")
			.json(&serde_json::json!({ "storeId": 5 }))
			.expect("JSON body should serialize.");
		let http = request
			.to_http(&config(), Some("Bearer tok1"))
			.expect("Request should convert to an HTTP request.");

		assert_eq!(http.method(), Method::POST);
		assert_eq!(
			http.uri().to_string(),
			"https://api.example.com/v1/orders?page=2&status=pending+pickup"
		);
		assert_eq!(http.headers()[header::AUTHORIZATION], "Bearer tok1");
		assert_eq!(http.headers()[header::CONTENT_TYPE], "application/json");
		assert_eq!(http.body().as_slice(), br#"{"storeId":5}"#);
	}

	#[test]
	fn caller_supplied_authorization_is_replaced() {
		let request = ApiRequest::get("/stores")
			.header(header::AUTHORIZATION, HeaderValue::from_static("Bearer stale"));
		let http = request
			.to_http(&config(), Some("Bearer fresh"))
			.expect("Request should convert to an HTTP request.");

		assert_eq!(http.headers()[header::AUTHORIZATION], "Bearer fresh");
		assert!(http.headers().get(header::CONTENT_TYPE).is_none());
	}

	#[test]
	fn absolute_paths_cannot_redirect_the_bearer() {
		for path in ["https://evil.example/x", "/https://evil.example/x"] {
			let err = ApiRequest::get(path)
				.to_http(&config(), Some("Bearer tok1"))
				.expect_err("Paths leaving the backend origin must be rejected.");

			assert!(
				matches!(err, ConfigError::ForeignPath { path: ref rejected } if rejected == path),
				"unexpected error for {path}: {err:?}"
			);
		}
	}

	#[test]
	fn error_message_prefers_backend_message() {
		assert_eq!(response(404, r#"{"message":"Order 9 not found"}"#).error_message(), "Order 9 not found");
		assert_eq!(
			response(400, r#"{"message":["name should not be empty","price must be positive"]}"#)
				.error_message(),
			"name should not be empty; price must be positive"
		);
		assert_eq!(response(502, "upstream down").error_message(), "upstream down");
		assert_eq!(response(500, "{}").error_message(), "Internal Server Error");
	}

	#[test]
	fn error_for_status_passes_success_through() {
		let ok = response(200, "{}").error_for_status().expect("2xx responses pass through.");

		assert!(ok.is_success());

		let err = response(409, r#"{"message":"Route already dispatched"}"#)
			.error_for_status()
			.expect_err("409 should become an API error.");

		assert!(matches!(err, Error::Api { status: 409, ref message } if message == "Route already dispatched"));
	}

	#[test]
	fn envelope_and_path_aware_decoding() {
		let orders: Vec<u32> =
			response(200, r#"{"data":[1,2,3]}"#).data().expect("Envelope should decode.");

		assert_eq!(orders, [1, 2, 3]);

		let bare: Vec<u32> =
			response(200, "[4]").json_or_data().expect("Bare payload should decode.");

		assert_eq!(bare, [4]);

		let err = response(200, r#"{"data":[1,"x"]}"#)
			.data::<Vec<u32>>()
			.expect_err("Mistyped element should fail.");

		assert!(matches!(err, Error::Decode(DecodeError::Json { ref path, .. }) if path == "data[1]"));
	}
}
