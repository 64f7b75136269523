//! Response body parsing plus the field lookups the request lifecycle depends on.
//!
//! Bodies are classified purely structurally: a JSON content type (`application/json` or any
//! `+json` suffix) yields [`ResponseBody::Json`], everything else is kept as text.

// crates.io
use http::header::CONTENT_TYPE;
// self
use crate::{_prelude::*, transport::HttpResponse};

/// Body field carrying a newly issued bearer credential.
pub const CREDENTIAL_FIELD: &str = "access_token";
/// Body field carrying a human-readable error explanation.
pub const ERROR_DETAIL_FIELD: &str = "detail";

/// Parsed response payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// Body declared as JSON. An empty JSON body parses as [`Value::Null`].
	Json(Value),
	/// Any other body, decoded lossily as UTF-8.
	Text(String),
}
impl ResponseBody {
	/// Parses a raw response using its `Content-Type` header.
	///
	/// A body that claims to be JSON but fails to parse falls back to text so the caller
	/// still sees what the server sent.
	pub fn parse(response: &HttpResponse) -> Self {
		let bytes = response.body();

		if is_json_content_type(response.headers().get(CONTENT_TYPE)) {
			if bytes.iter().all(u8::is_ascii_whitespace) {
				return Self::Json(Value::Null);
			}
			if let Ok(value) = serde_json::from_slice(bytes) {
				return Self::Json(value);
			}
		}

		Self::Text(String::from_utf8_lossy(bytes).into_owned())
	}

	/// Returns `true` when the server sent nothing meaningful.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Json(value) => value.is_null(),
			Self::Text(text) => text.is_empty(),
		}
	}

	/// Returns the JSON value, if the body was JSON.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			Self::Text(_) => None,
		}
	}

	/// Returns the string credential field of a JSON object body, if present.
	pub fn credential(&self) -> Option<&str> {
		self.as_json()?.as_object()?.get(CREDENTIAL_FIELD)?.as_str()
	}

	/// Extracts the error message from the body's detail field.
	///
	/// String details are returned verbatim; structured details (validation error lists) are
	/// rendered as compact JSON.
	pub fn error_detail(&self) -> Option<String> {
		let detail = self.as_json()?.as_object()?.get(ERROR_DETAIL_FIELD)?;

		match detail {
			Value::Null => None,
			Value::String(message) => Some(message.clone()),
			other => Some(other.to_string()),
		}
	}

	/// Decodes the body into the caller's expected shape.
	///
	/// Text bodies are presented to serde as a JSON string so `String` targets work for both
	/// body kinds. An empty text body (`204 No Content`) decodes as `null` first, so `()` and
	/// `Option<T>` targets see nothing, and falls back to `""` for string targets.
	pub fn decode<T>(self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		match self {
			Self::Json(value) => serde_path_to_error::deserialize(value),
			Self::Text(text) if text.is_empty() => serde_path_to_error::deserialize(Value::Null)
				.or_else(|_| serde_path_to_error::deserialize(Value::String(text))),
			Self::Text(text) => serde_path_to_error::deserialize(Value::String(text)),
		}
	}
}

fn is_json_content_type(value: Option<&http::HeaderValue>) -> bool {
	let Some(raw) = value.and_then(|v| v.to_str().ok()) else {
		return false;
	};
	let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

	essence == "application/json" || essence.ends_with("+json")
}
