#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use crm_api_client::{
	_preludet::*,
	request::RequestDescriptor,
	session::TokenSecret,
	store::{CredentialStore, MemoryStore, StoredCredential},
};

async fn seed_stale_credential(store: &MemoryStore) {
	store
		.save("access_token", StoredCredential::new(TokenSecret::new("stale")))
		.await
		.expect("Failed to seed stale credential into the store.");
}

async fn mirrored_token(store: &MemoryStore) -> Option<String> {
	store
		.load("access_token")
		.await
		.expect("Memory store load should succeed.")
		.map(|stored| stored.token.expose().to_owned())
}

#[tokio::test]
async fn stale_credential_is_refreshed_and_request_retried_once() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	let rejected = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/deals").header("authorization", "Bearer stale");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token expired\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh").header_missing("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"new\"}");
		})
		.await;
	let retried = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/deals")
				.header("authorization", "Bearer new")
				.body("{\"amount\":1200}");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let follow_up = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/deals").header("authorization", "Bearer new");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let body: Value = client
		.post("deals", &json!({ "amount": 1200 }))
		.await
		.expect("Request should succeed after a transparent refresh.");

	assert_eq!(body, json!({ "ok": true }));

	let deals: Vec<Value> = client.get("deals").await.expect("Follow-up GET should succeed.");

	assert!(deals.is_empty());

	rejected.assert_async().await;
	refresh.assert_async().await;
	retried.assert_async().await;
	follow_up.assert_async().await;

	assert_eq!(client.credential().as_ref().map(TokenSecret::expose), Some("new"));
	assert_eq!(mirrored_token(&store).await.as_deref(), Some("new"));
	assert_eq!(client.metrics().refresh_attempts(), 1);
	assert_eq!(client.metrics().refresh_successes(), 1);
	assert_eq!(client.metrics().retries(), 1);
}

#[tokio::test]
async fn retry_rejected_again_is_not_refreshed_twice() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/reports/revenue");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Not authenticated\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"still-rejected\"}");
		})
		.await;
	let err = client
		.get::<Value>("reports/revenue")
		.await
		.expect_err("A retry that is rejected again should surface as 401.");

	assert_eq!(err.status(), 401);
	assert!(err.is_unauthorized());

	protected.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;

	assert_eq!(client.metrics().retries(), 1);
	assert_eq!(client.credential().as_ref().map(TokenSecret::expose), Some("still-rejected"));
}

#[tokio::test]
async fn refresh_rejection_clears_credential_and_surfaces_original_401() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	let protected = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/customers").header("authorization", "Bearer stale");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token expired\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(403)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Refresh session revoked\"}");
		})
		.await;
	let retry = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/customers").header_missing("authorization");
			then.status(201).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = client
		.post::<_, Value>("customers", &json!({ "name": "Hooli" }))
		.await
		.expect_err("Failed refresh should surface the original 401.");

	match &err {
		Error::Http(http) => {
			assert_eq!(http.status, 401);
			assert_eq!(http.message, "Token expired");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	protected.assert_async().await;
	refresh.assert_async().await;
	retry.assert_calls_async(0).await;

	assert!(client.credential().is_none());
	assert_eq!(mirrored_token(&store).await, None);
	assert_eq!(client.metrics().refresh_failures(), 1);
	assert_eq!(client.metrics().retries(), 0);
}

#[tokio::test]
async fn refresh_without_credential_field_counts_as_failure() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/products");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let err = client
		.get::<Value>("products")
		.await
		.expect_err("Refresh without a credential should not retry.");

	assert_eq!(err.status(), 401);
	assert!(matches!(&err, Error::Http(e) if e.message == "Unauthorized"));

	refresh.assert_async().await;

	assert!(client.credential().is_none());
	assert_eq!(mirrored_token(&store).await, None);
}

#[tokio::test]
async fn skip_refresh_surfaces_401_untouched() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"unused\"}");
		})
		.await;
	let err = client
		.request::<Value>("auth/logout", RequestDescriptor::post().skip_refresh())
		.await
		.expect_err("401 should surface when refresh is skipped.");

	assert_eq!(err.status(), 401);

	refresh.assert_calls_async(0).await;

	assert_eq!(client.credential().as_ref().map(TokenSecret::expose), Some("stale"));
	assert_eq!(mirrored_token(&store).await.as_deref(), Some("stale"));
}

#[tokio::test]
async fn refresh_exchange_presents_the_session_cookie() {
	let server = MockServer::start_async().await;
	let (client, _) = build_reqwest_test_client(&server.url("/api"));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.header("set-cookie", "refresh_session=cookie-123; Path=/; HttpOnly")
				.body("{\"access_token\":\"first\"}");
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/refresh")
				.header("cookie", "refresh_session=cookie-123")
				.header_missing("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"second\"}");
		})
		.await;
	let _: Value = client
		.request("auth/login", RequestDescriptor::post().skip_auth())
		.await
		.expect("Login should succeed.");
	let renewed = client.refresh().await.expect("Cookie-authenticated refresh should succeed.");

	refresh.assert_async().await;

	assert_eq!(renewed.expose(), "second");
	assert_eq!(client.credential(), Some(renewed));
}

#[tokio::test]
async fn concurrent_rejections_each_refresh() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.url("/api"));

	seed_stale_credential(&store).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/customers").header("authorization", "Bearer stale");
			then.status(401).header("content-type", "application/json").body("{}");
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"shared\"}");
		})
		.await;
	let retried = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/customers").header("authorization", "Bearer shared");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let (first, second): (Result<Vec<Value>>, Result<Vec<Value>>) =
		tokio::join!(client.get("customers"), client.get("customers"));

	first.expect("First concurrent request should recover.");
	second.expect("Second concurrent request should recover.");

	refresh.assert_calls_async(2).await;
	retried.assert_calls_async(2).await;

	assert_eq!(client.credential().as_ref().map(TokenSecret::expose), Some("shared"));
}
