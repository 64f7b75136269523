//! Demonstrates plugging a non-reqwest transport into the client.
//!
//! 1. Implement [`ApiTransport`] so every call resolves to a buffered [`HttpResponse`].
//! 2. Hand the transport to [`Client::with_transport`]; timeouts, bearer attachment, and error
//!    classification stay in the client.
//! 3. Inspect the [`Error`] variants the client produces from the canned responses.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
use serde_json::{Value, json};
// self
use crm_api_client::{
	client::Client,
	config::ClientConfig,
	error::{Error, TransportError},
	http::{StatusCode, header::AUTHORIZATION},
	transport::{ApiTransport, HttpRequest, HttpResponse, TransportFuture},
};

/// Answers from a fixed table keyed by path and counts the calls it served.
#[derive(Default)]
struct CannedTransport {
	calls: AtomicUsize,
}
impl ApiTransport for CannedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.calls.fetch_add(1, Ordering::Relaxed);

		Box::pin(async move {
			let authorized = request.headers().contains_key(AUTHORIZATION);
			let (status, body) = match request.uri().path() {
				"/api/products" if authorized => (StatusCode::OK, json!([{ "sku": "A-1" }])),
				"/api/products" => (StatusCode::FORBIDDEN, json!({ "detail": "Login required" })),
				_ => (StatusCode::NOT_FOUND, json!({ "detail": "No such route" })),
			};
			let response = crm_api_client::http::Response::builder()
				.status(status)
				.header("content-type", "application/json")
				.body(body.to_string().into_bytes())
				.map_err(TransportError::network)?;

			Ok(response)
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::parse("https://crm.example.com/api")?;
	let transport = Arc::new(CannedTransport::default());
	let client: Client<CannedTransport> = Client::with_transport(config, transport.clone());

	match client.get::<Value>("products").await {
		Err(Error::Http(e)) => println!("Anonymous call rejected: {} {}.", e.status, e.message),
		other => println!("Unexpected anonymous result: {other:?}."),
	}

	client.set_credential("demo-token").await;

	let products: Value = client.get("products").await?;

	println!("Products: {products}");

	let missing = client.get::<Value>("orders").await.map_err(|e| e.status());

	println!("Missing route status: {missing:?}");
	println!("Calls served: {}", transport.calls.load(Ordering::Relaxed));

	Ok(())
}
