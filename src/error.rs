//! Client-level error types shared across the request lifecycle, transports, and stores.

// self
use crate::{_prelude::*, response::ResponseBody};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every variant maps onto a numeric status through [`Error::status`]: `0` when nothing
/// usable came back from the server (network failure, timeout, local misconfiguration) and
/// the HTTP status otherwise.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) or timeout.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Backend answered with a non-success status.
	#[error(transparent)]
	Http(#[from] HttpError),

	/// Backend answered successfully but the body does not match the expected shape.
	#[error("Response body could not be decoded into the requested type.")]
	Decode {
		/// HTTP status of the decoded response.
		status: u16,
		/// Structured decoding failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the numeric classification: `0` for network/timeout/local failures, otherwise
	/// the HTTP status of the response that caused the error.
	pub fn status(&self) -> u16 {
		match self {
			Self::Config(_) | Self::Transport(_) => 0,
			Self::Http(e) => e.status,
			Self::Decode { status, .. } => *status,
		}
	}

	/// Returns `true` when the backend rejected the credential (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Http(e) if e.status == 401)
	}

	/// Returns the raw response payload attached to HTTP errors.
	pub fn payload(&self) -> Option<&ResponseBody> {
		match self {
			Self::Http(e) => e.payload.as_ref(),
			_ => None,
		}
	}
}

/// Non-success response surfaced to the caller.
#[derive(Debug, ThisError)]
#[error("Request failed with status {status}: {message}.")]
pub struct HttpError {
	/// HTTP status code returned by the backend.
	pub status: u16,
	/// Message from the body's `detail` field, or the canonical status reason.
	pub message: String,
	/// Parsed response body, when one was returned.
	pub payload: Option<ResponseBody>,
}
impl HttpError {
	/// Builds an error from a final response status and its parsed body.
	pub fn from_response(status: http::StatusCode, payload: ResponseBody) -> Self {
		let message = payload.error_detail().unwrap_or_else(|| {
			status.canonical_reason().unwrap_or("Request failed").to_owned()
		});
		let payload = if payload.is_empty() { None } else { Some(payload) };

		Self { status: status.as_u16(), message, payload }
	}
}

/// Configuration and request-construction failures raised before anything is sent.
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
	HttpRequest(#[from] http::Error),
	/// Base endpoint is not an absolute HTTP(S) URL.
	#[error("Base endpoint `{url}` must be an absolute http or https URL.")]
	InvalidBaseEndpoint {
		/// Offending endpoint.
		url: String,
	},
	/// Base endpoint could not be parsed.
	#[error("Base endpoint cannot be parsed.")]
	UnparsableBaseEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path cannot be parsed or resolves outside the base endpoint.
	#[error("Request path `{path}` does not resolve under the base endpoint.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Parsing failure; `None` when the path parsed but escaped the base.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Timeout override from the environment is not a number of milliseconds.
	#[error("Timeout `{value}` is not a valid number of milliseconds.")]
	InvalidTimeout {
		/// Offending raw value.
		value: String,
	},
	/// Structured body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialize(#[source] serde_json::Error),
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

/// Transport-level failures (network, IO, timeout); always classified as status `0`.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call did not complete before its deadline and was aborted.
	#[error("Request timed out after {} ms.", .after.as_millis())]
	Timeout {
		/// Deadline that elapsed.
		after: Duration,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn transport_and_config_errors_classify_as_status_zero() {
		let timeout: Error = TransportError::Timeout { after: Duration::from_millis(15) }.into();
		let config: Error = ConfigError::InvalidTimeout { value: "soon".into() }.into();

		assert_eq!(timeout.status(), 0);
		assert_eq!(config.status(), 0);
		assert_eq!(timeout.to_string(), "Request timed out after 15 ms.");
	}

	#[test]
	fn http_error_prefers_detail_over_status_reason() {
		let body = ResponseBody::Json(serde_json::json!({ "detail": "Customer not found" }));
		let err = HttpError::from_response(http::StatusCode::NOT_FOUND, body);

		assert_eq!(err.status, 404);
		assert_eq!(err.message, "Customer not found");
		assert!(err.payload.is_some());

		let err = HttpError::from_response(
			http::StatusCode::BAD_GATEWAY,
			ResponseBody::Text(String::new()),
		);

		assert_eq!(err.message, "Bad Gateway");
		assert!(err.payload.is_none());
	}

	#[test]
	fn unauthorized_helper_matches_only_401() {
		let unauthorized: Error = HttpError::from_response(
			http::StatusCode::UNAUTHORIZED,
			ResponseBody::Json(Value::Null),
		)
		.into();
		let forbidden: Error =
			HttpError::from_response(http::StatusCode::FORBIDDEN, ResponseBody::Json(Value::Null))
				.into();

		assert!(unauthorized.is_unauthorized());
		assert_eq!(unauthorized.status(), 401);
		assert!(!forbidden.is_unauthorized());
	}
}
