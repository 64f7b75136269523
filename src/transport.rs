//! Transport primitives for outbound API calls.
//!
//! The module exposes [`ApiTransport`] so downstream crates (and tests) can swap the HTTP
//! stack without touching the request lifecycle. The client owns credential handling,
//! timeouts, and classification; a transport only has to move bytes and carry the
//! session cookie jar.

// self
use crate::{_prelude::*, error::TransportError};

/// Outbound request as seen by a transport.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Fully buffered response handed back by a transport.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute API calls.
///
/// Implementations must include ambient credentials (cookies) the same way for every call,
/// because the refresh exchange authenticates through the session cookie alone. Dropping
/// the returned future must abort the in-flight call; the client relies on that to enforce
/// timeouts.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and buffers the full response body.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}
impl<T> ApiTransport for Arc<T>
where
	T: ?Sized + ApiTransport,
{
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] with a cookie jar enabled so the refresh exchange
/// can present the session cookie set during login.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a fresh cookie store.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// Configure the client with `cookie_store(true)` (or a custom cookie provider) when the
	/// backend relies on cookie-based refresh.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request).map_err(TransportError::from)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
