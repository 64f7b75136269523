// self
use crate::{
	_prelude::*,
	obs::{AttemptKind, ExchangeClass},
	store::StoreError,
	transport::HttpRequest,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAttempt<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAttempt<F> = F;

/// Span wrapper used around each network exchange.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Opens a span for `request`. Only the method and URL path are recorded; query strings
	/// and headers (the bearer credential) stay out of traces.
	pub fn new(kind: AttemptKind, request: &HttpRequest) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"crm_api_client.exchange",
				attempt = kind.as_str(),
				method = request.method().as_str(),
				path = request.uri().path(),
				class = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, request);

			Self {}
		}
	}

	/// Stamps the settled exchange class onto the span.
	pub fn record_class(&self, class: ExchangeClass) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("class", class.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = class;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAttempt<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports a credential mirror failure; the session keeps working from memory.
pub fn record_store_failure(operation: &'static str, error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(operation, %error, "credential mirror operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, error);
	}
}

/// Reports the result of a refresh exchange.
pub fn record_refresh_result(status: Option<u16>, renewed: bool) {
	#[cfg(feature = "tracing")]
	{
		if renewed {
			tracing::debug!(?status, "session credential refreshed");
		} else {
			tracing::debug!(?status, "refresh exchange did not yield a credential");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, renewed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_noop_without_subscriber() {
		let request = http::Request::builder()
			.method(http::Method::GET)
			.uri("https://crm.example.com/api/customers?page=2")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let span = RequestSpan::new(AttemptKind::Primary, &request);

		span.record_class(ExchangeClass::Unauthorized);
		record_store_failure("save", &StoreError::Backend { message: "offline".into() });
		record_refresh_result(Some(403), false);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let request = http::Request::builder()
			.method(http::Method::POST)
			.uri("https://crm.example.com/api/auth/refresh")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let span = RequestSpan::new(AttemptKind::Refresh, &request);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
