//! Per-call request descriptors and their encoding into transport requests.

pub use http::Method;

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{_prelude::*, error::ConfigError, session::TokenSecret, transport::HttpRequest};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// Structured payload, serialized to JSON text before sending and defaulted to a JSON
	/// content type.
	Json(Value),
	/// Pre-encoded payload (multipart form, file upload, CSV import) passed through unchanged;
	/// the caller sets the content type.
	Raw(Vec<u8>),
}
impl RequestBody {
	/// Serializes any [`Serialize`] value into a structured body.
	pub fn json<T>(value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		serde_json::to_value(value).map(Self::Json).map_err(ConfigError::BodySerialize)
	}

	fn is_structured(&self) -> bool {
		matches!(self, Self::Json(_))
	}

	fn into_bytes(self) -> Result<Vec<u8>, ConfigError> {
		match self {
			Self::Json(value) => serde_json::to_vec(&value).map_err(ConfigError::BodySerialize),
			Self::Raw(bytes) => Ok(bytes),
		}
	}
}
impl From<Value> for RequestBody {
	fn from(value: Value) -> Self {
		Self::Json(value)
	}
}
impl From<Vec<u8>> for RequestBody {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Raw(bytes)
	}
}

/// Describes one logical request. Constructed per call and consumed by it.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Optional payload.
	pub body: Option<RequestBody>,
	/// Caller-supplied headers; these win over every default except `Authorization`.
	pub headers: HeaderMap,
	/// Per-call timeout; falls back to the client default when absent.
	pub timeout: Option<Duration>,
	/// Do not attach the session credential.
	pub skip_auth: bool,
	/// Do not attempt refresh-and-retry on `401`.
	pub skip_refresh: bool,
}
impl RequestDescriptor {
	/// Creates a descriptor for the given method with no body and default flags.
	pub fn new(method: Method) -> Self {
		Self {
			method,
			body: None,
			headers: HeaderMap::new(),
			timeout: None,
			skip_auth: false,
			skip_refresh: false,
		}
	}

	/// Shorthand for a `GET` descriptor.
	pub fn get() -> Self {
		Self::new(Method::GET)
	}

	/// Shorthand for a `POST` descriptor.
	pub fn post() -> Self {
		Self::new(Method::POST)
	}

	/// Attaches a payload.
	pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Attaches a structured payload serialized from `value`.
	pub fn with_json<T>(self, value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Ok(self.with_body(RequestBody::json(value)?))
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Overrides the timeout for this call.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sends the request without the session credential.
	pub fn skip_auth(mut self) -> Self {
		self.skip_auth = true;

		self
	}

	/// Surfaces `401` responses directly instead of refreshing.
	pub fn skip_refresh(mut self) -> Self {
		self.skip_refresh = true;

		self
	}

	/// Builds the transport request for `url`, attaching `credential` unless `skip_auth` is
	/// set.
	///
	/// The descriptor is borrowed so the same call can be re-encoded for the retry attempt
	/// after a refresh.
	pub(crate) fn encode(
		&self,
		url: &Url,
		credential: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let mut headers = self.headers.clone();

		if !headers.contains_key(ACCEPT) {
			headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
		}
		if self.body.as_ref().is_some_and(RequestBody::is_structured)
			&& !headers.contains_key(CONTENT_TYPE)
		{
			headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
		}
		if let Some(secret) = credential.filter(|_| !self.skip_auth) {
			headers.insert(AUTHORIZATION, bearer(secret)?);
		}

		let body = match self.body.clone() {
			Some(body) => body.into_bytes()?,
			None => Vec::new(),
		};
		let mut request = http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if let Some(slot) = request.headers_mut() {
			*slot = headers;
		}

		Ok(request.body(body)?)
	}
}
impl Default for RequestDescriptor {
	fn default() -> Self {
		Self::get()
	}
}

fn bearer(secret: &TokenSecret) -> Result<HeaderValue, ConfigError> {
	let mut value = HeaderValue::try_from(format!("Bearer {}", secret.expose()))
		.map_err(|e| ConfigError::HttpRequest(e.into()))?;

	value.set_sensitive(true);

	Ok(value)
}
