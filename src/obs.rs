//! Optional observability helpers for the request lifecycle.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every network exchange in a `crm_api_client.exchange` span with
//!   `attempt`, `method`, `path`, and (once settled) `class` fields, plus events for refresh
//!   results and credential mirror failures.
//! - Enable `metrics` to count settled exchanges in `crm_api_client_exchange_total`
//!   (labels `attempt`, `class`) and to record their latency in
//!   `crm_api_client_exchange_duration_seconds` (label `attempt`).

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// crates.io
use http::StatusCode;
// self
use crate::{_prelude::*, error::TransportError, transport::HttpResponse};

/// Network exchanges a single logical request can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttemptKind {
	/// First send of the caller's request.
	Primary,
	/// Cookie-authenticated refresh exchange after a `401`.
	Refresh,
	/// Single resend carrying the refreshed credential.
	Retry,
}
impl AttemptKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AttemptKind::Primary => "primary",
			AttemptKind::Refresh => "refresh",
			AttemptKind::Retry => "retry",
		}
	}
}
impl Display for AttemptKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How a settled exchange ended, as seen from the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeClass {
	/// `2xx` response.
	Success,
	/// `401` response; the only class that can trigger a refresh.
	Unauthorized,
	/// Any other `4xx` response.
	ClientError,
	/// `5xx` or otherwise unexpected status.
	ServerError,
	/// Deadline elapsed and the call was aborted.
	TimedOut,
	/// Nothing came back (DNS, TCP, TLS, IO).
	Unreachable,
}
impl ExchangeClass {
	/// Classifies the outcome handed back by a transport under a deadline.
	pub fn classify(result: &Result<HttpResponse>) -> Self {
		match result {
			Ok(response) => Self::from_status(response.status()),
			Err(Error::Transport(TransportError::Timeout { .. })) => Self::TimedOut,
			Err(_) => Self::Unreachable,
		}
	}

	fn from_status(status: StatusCode) -> Self {
		if status.is_success() {
			Self::Success
		} else if status == StatusCode::UNAUTHORIZED {
			Self::Unauthorized
		} else if status.is_client_error() {
			Self::ClientError
		} else {
			Self::ServerError
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeClass::Success => "success",
			ExchangeClass::Unauthorized => "unauthorized",
			ExchangeClass::ClientError => "client_error",
			ExchangeClass::ServerError => "server_error",
			ExchangeClass::TimedOut => "timed_out",
			ExchangeClass::Unreachable => "unreachable",
		}
	}
}
impl Display for ExchangeClass {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
