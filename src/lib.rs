//! Authenticated REST request client for the CRM backend: bearer credentials, transparent
//! refresh-and-retry on `401`, and classified errors in one small async crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod error;
pub mod obs;
pub mod request;
pub mod response;
pub mod session;
pub mod store;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::Client,
		config::ClientConfig,
		store::{CredentialStore, MemoryStore},
		transport::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestTransport>;

	/// Builds a configuration rooted at `base` (usually an `httpmock` server URL).
	pub fn test_config(base: &str) -> ClientConfig {
		let base = Url::parse(base).expect("Failed to parse test base endpoint.");

		ClientConfig::new(base).expect("Test base endpoint should be a valid HTTP URL.")
	}

	/// Constructs a [`Client`] backed by a fresh in-memory credential store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_client(base: &str) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let client = build_reqwest_test_client_with_store(base, store_backend.clone());

		(client, store_backend)
	}

	/// Constructs a [`Client`] that mirrors its credential into the provided store.
	pub fn build_reqwest_test_client_with_store(
		base: &str,
		store: Arc<dyn CredentialStore>,
	) -> ReqwestTestClient {
		let transport =
			ReqwestTransport::new().expect("Failed to build reqwest transport for tests.");

		Client::with_transport(test_config(base), transport).with_store(store)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
