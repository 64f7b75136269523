//! Demonstrates a login that seeds the session, a `401` recovered through the cookie-based
//! refresh exchange, and the renewed credential being reused on the next call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use crm_api_client::{
	client::ReqwestApiClient,
	config::ClientConfig,
	request::RequestDescriptor,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.header("set-cookie", "refresh_session=demo; Path=/; HttpOnly")
				.body("{\"access_token\":\"expired-soon\"}");
		})
		.await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/customers").header("authorization", "Bearer expired-soon");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token expired\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh").header("cookie", "refresh_session=demo");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"renewed\"}");
		})
		.await;
	let customers = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/customers").header("authorization", "Bearer renewed");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"name\":\"Acme\"}]");
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let config = ClientConfig::parse(&server.url("/api"))?;
	let client = ReqwestApiClient::new(config)?.with_store(store.clone());
	let _: Value = client
		.request(
			"auth/login",
			RequestDescriptor::post()
				.skip_auth()
				.with_json(&json!({ "email": "ops@example.com", "password": "demo" }))?,
		)
		.await?;
	let listed: Vec<Value> = client.get("customers").await?;

	login.assert_async().await;
	rejected.assert_async().await;
	refresh.assert_async().await;
	customers.assert_async().await;

	let mirrored = store.load(client.config().storage_key.as_str()).await?;

	println!("Customers: {listed:?}");
	println!("Session credential: {:?}", client.credential());
	println!("Mirrored at: {:?}", mirrored.map(|stored| stored.saved_at));
	println!("Lifecycle counters: {:?}", client.metrics());

	Ok(())
}
