//! Persistent mirror contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, session::TokenSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the session credential mirror.
///
/// Each key holds at most one credential. Sessions treat every error as non-fatal, so
/// implementations should report failures rather than retry internally.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the credential stored under `key`, if present.
	fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StoredCredential>>;

	/// Persists or replaces the credential stored under `key`.
	fn save<'a>(&'a self, key: &'a str, credential: StoredCredential) -> StoreFuture<'a, ()>;

	/// Removes the credential stored under `key`, returning the previous value.
	fn clear<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StoredCredential>>;
}

/// Credential snapshot written to a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
	/// Raw bearer credential.
	pub token: TokenSecret,
	/// Instant the credential was mirrored.
	pub saved_at: OffsetDateTime,
}
impl StoredCredential {
	/// Wraps `token` with the current timestamp.
	pub fn new(token: TokenSecret) -> Self {
		Self { token, saved_at: OffsetDateTime::now_utc() }
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
