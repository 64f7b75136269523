//! Cookie-authenticated refresh exchange.
//!
//! The exchange posts to the configured refresh endpoint with no body and no bearer header;
//! the transport's cookie jar carries the session cookie. A `2xx` JSON object with a string
//! `access_token` renews the session; anything else (transport failure, timeout, non-success
//! status, missing field) clears it. Concurrent callers are not coordinated: each `401`
//! performs its own exchange and the last credential written wins.

// self
use crate::{
	_prelude::*,
	client::Client,
	obs::{self, AttemptKind},
	request::RequestDescriptor,
	response::ResponseBody,
	session::TokenSecret,
	transport::ApiTransport,
};

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Performs one refresh exchange and updates the session with its result.
	///
	/// Returns the renewed credential, or `None` after clearing the session when the
	/// exchange did not produce one.
	pub async fn refresh(&self) -> Option<TokenSecret> {
		self.metrics.record_refresh_attempt();

		match self.exchange_refresh().await {
			Ok(Some(secret)) => {
				self.session.set(secret.clone()).await;
				self.metrics.record_refresh_success();

				Some(secret)
			},
			Ok(None) | Err(_) => {
				self.session.clear().await;
				self.metrics.record_refresh_failure();

				None
			},
		}
	}

	async fn exchange_refresh(&self) -> Result<Option<TokenSecret>> {
		let url = self.config.refresh_endpoint()?;
		let request = RequestDescriptor::post().skip_auth().skip_refresh().encode(&url, None)?;
		let response = self.send(AttemptKind::Refresh, request, self.config.default_timeout).await;
		let response = match response {
			Ok(response) => response,
			Err(e) => {
				obs::record_refresh_result(None, false);

				return Err(e);
			},
		};
		let status = response.status();
		let renewed = if status.is_success() {
			ResponseBody::parse(&response).credential().map(TokenSecret::new)
		} else {
			None
		};

		obs::record_refresh_result(Some(status.as_u16()), renewed.is_some());

		Ok(renewed)
	}
}
