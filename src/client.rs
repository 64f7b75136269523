//! Authenticated request client: credential attachment, timeouts, refresh-and-retry, and
//! error classification for every call against the configured base endpoint.
//!
//! # Request lifecycle
//!
//! ```text
//! INIT -> LOAD -> SENDING -> SUCCESS
//!                         -> ERROR
//!                         -> FAILED_AUTH -> REFRESHING -> RETRY_SENDING -> SUCCESS | ERROR
//!                                                      -> ERROR
//! ```
//!
//! [`Client::request`] walks the diagram in straight-line code: one primary send, at most one
//! refresh exchange, and at most one retry. The retry is issued from a separate code path that
//! never inspects its status for recovery, so a second `401` is surfaced as-is.

mod metrics;
mod refresh;

pub use metrics::ClientMetrics;

// std
use std::time::Instant;
// crates.io
use http::{Method, StatusCode};
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{HttpError, TransportError},
	obs::{self, AttemptKind, ExchangeClass, RequestSpan},
	request::RequestDescriptor,
	response::ResponseBody,
	session::{Session, TokenSecret},
	store::CredentialStore,
	transport::{ApiTransport, HttpRequest, HttpResponse},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestTransport>;

/// Performs authenticated calls against one backend on behalf of one session.
///
/// Clones share the transport, session, and counters, so a clone handed to another task
/// observes credential updates made through the original.
pub struct Client<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	config: ClientConfig,
	session: Arc<Session>,
	metrics: Arc<ClientMetrics>,
}
impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that sends through the caller-provided transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let session = Arc::new(Session::new(config.storage_key.clone()));

		Self { transport: transport.into(), config, session, metrics: Default::default() }
	}

	/// Replaces the session with one mirrored into `store`.
	///
	/// Call this while building the client; a credential set on the previous session is
	/// dropped.
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.session = Arc::new(Session::new(self.config.storage_key.clone()).with_store(store));

		self
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Session holding the bearer credential.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Lifecycle counters.
	pub fn metrics(&self) -> &ClientMetrics {
		&self.metrics
	}

	/// Returns the in-memory credential, if any.
	pub fn credential(&self) -> Option<TokenSecret> {
		self.session.current()
	}

	/// Seeds the session with a credential obtained elsewhere (e.g. an SSO callback).
	pub async fn set_credential(&self, secret: impl Into<Arc<str>>) {
		self.session.set(TokenSecret::new(secret)).await;
	}

	/// Forgets the credential in memory and in the persistent mirror.
	pub async fn logout(&self) {
		self.session.clear().await;
	}

	/// Performs one logical request and decodes the parsed body into `R`.
	pub async fn request<R>(&self, path: &str, descriptor: RequestDescriptor) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let (status, body) = self.execute(path, descriptor).await?;

		body.decode().map_err(|source| Error::Decode { status: status.as_u16(), source })
	}

	/// Performs one logical request and returns the parsed body without decoding it.
	pub async fn request_body(
		&self,
		path: &str,
		descriptor: RequestDescriptor,
	) -> Result<ResponseBody> {
		let (_, body) = self.execute(path, descriptor).await?;

		Ok(body)
	}

	/// `GET path`.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(path, RequestDescriptor::get()).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request(path, RequestDescriptor::post().with_json(body)?).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request(path, RequestDescriptor::new(Method::PUT).with_json(body)?).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request(path, RequestDescriptor::new(Method::PATCH).with_json(body)?).await
	}

	/// `DELETE path`.
	pub async fn delete<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(path, RequestDescriptor::new(Method::DELETE)).await
	}

	async fn execute(
		&self,
		path: &str,
		descriptor: RequestDescriptor,
	) -> Result<(StatusCode, ResponseBody)> {
		self.metrics.record_request();

		let url = self.config.endpoint(path)?;
		let timeout = descriptor.timeout.unwrap_or(self.config.default_timeout);
		let credential = self.session.load().await;
		let request = descriptor.encode(&url, credential.as_ref())?;
		let mut response = self.send(AttemptKind::Primary, request, timeout).await?;

		if response.status() == StatusCode::UNAUTHORIZED && !descriptor.skip_refresh {
			if let Some(renewed) = self.refresh().await {
				let retry = descriptor.encode(&url, Some(&renewed))?;

				self.metrics.record_retry();

				response = self.send(AttemptKind::Retry, retry, timeout).await?;
			}
		}

		self.finish(response).await
	}

	async fn finish(&self, response: HttpResponse) -> Result<(StatusCode, ResponseBody)> {
		let status = response.status();
		let body = ResponseBody::parse(&response);

		if !status.is_success() {
			return Err(HttpError::from_response(status, body).into());
		}

		let captured = if self.config.capture_response_credentials {
			body.credential().map(TokenSecret::new)
		} else {
			None
		};

		if let Some(secret) = captured {
			self.session.set(secret).await;
		}

		Ok((status, body))
	}

	/// Sends one exchange, racing it against `timeout`.
	///
	/// The transport future and the timer live inside [`tokio::time::timeout`], so both are
	/// dropped on every exit path and an expired call is aborted rather than left running.
	async fn send(
		&self,
		kind: AttemptKind,
		request: HttpRequest,
		timeout: Duration,
	) -> Result<HttpResponse> {
		let span = RequestSpan::new(kind, &request);
		let started = Instant::now();
		let result = span
			.instrument(async move {
				match tokio::time::timeout(timeout, self.transport.send(request)).await {
					Ok(sent) => sent.map_err(Error::from),
					Err(_) => Err(TransportError::Timeout { after: timeout }.into()),
				}
			})
			.await;
		let class = ExchangeClass::classify(&result);

		span.record_class(class);
		obs::record_exchange(kind, class, started.elapsed());

		result
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a client with its own cookie-enabled reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Ok(Self::with_transport(config, ReqwestTransport::new()?))
	}

	/// Creates a reqwest-backed client configured from the environment.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}
}
impl<T> Clone for Client<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			session: self.session.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_endpoint", &self.config.base_endpoint.as_str())
			.field("session", &self.session)
			.finish()
	}
}
