//! Explicit session object owning the bearer credential and its persistent mirror.
//!
//! A [`Session`] replaces process-wide credential state: one client holds one session, the
//! in-memory copy is authoritative once set, and the optional [`CredentialStore`] mirror is
//! written best-effort so a later session in the same environment can pick the credential
//! back up. Mirror failures are reported through [`obs`](crate::obs) and never fail a call.

// self
use crate::{
	_prelude::*,
	obs,
	store::{CredentialStore, StoredCredential},
};

/// Default key under which the credential is mirrored.
pub const DEFAULT_STORAGE_KEY: &str = "access_token";

/// Redacted bearer credential keeping token material out of logs.
///
/// Backed by a shared string because every outbound call clones the current credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(Arc<str>);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<Arc<str>>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Credential lifecycle holder: construct, load, mutate, clear.
pub struct Session {
	credential: RwLock<Option<TokenSecret>>,
	store: Option<Arc<dyn CredentialStore>>,
	storage_key: String,
}
impl Session {
	/// Creates an empty session without a persistent mirror.
	pub fn new(storage_key: impl Into<String>) -> Self {
		Self { credential: RwLock::new(None), store: None, storage_key: storage_key.into() }
	}

	/// Attaches the persistent mirror consulted on first use.
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Key used for the persistent mirror.
	pub fn storage_key(&self) -> &str {
		&self.storage_key
	}

	/// Returns the in-memory credential without consulting the mirror.
	pub fn current(&self) -> Option<TokenSecret> {
		self.credential.read().clone()
	}

	/// Returns the credential, lazily loading it from the mirror when memory is empty.
	///
	/// A value written concurrently while the mirror is being read wins over the loaded one.
	pub async fn load(&self) -> Option<TokenSecret> {
		if let Some(secret) = self.current() {
			return Some(secret);
		}

		let store = self.store.as_ref()?;
		let stored = match store.load(&self.storage_key).await {
			Ok(stored) => stored?,
			Err(e) => {
				obs::record_store_failure("load", &e);

				return None;
			},
		};
		let mut guard = self.credential.write();

		Some(guard.get_or_insert(stored.token).clone())
	}

	/// Replaces the credential in memory, then mirrors it.
	pub async fn set(&self, secret: TokenSecret) {
		*self.credential.write() = Some(secret.clone());

		if let Some(store) = &self.store {
			let stored = StoredCredential::new(secret);

			if let Err(e) = store.save(&self.storage_key, stored).await {
				obs::record_store_failure("save", &e);
			}
		}
	}

	/// Forgets the credential in memory and in the mirror.
	pub async fn clear(&self) {
		self.credential.write().take();

		if let Some(store) = &self.store {
			if let Err(e) = store.clear(&self.storage_key).await {
				obs::record_store_failure("clear", &e);
			}
		}
	}
}
impl Default for Session {
	fn default() -> Self {
		Self::new(DEFAULT_STORAGE_KEY)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("storage_key", &self.storage_key)
			.field("credential_set", &self.credential.read().is_some())
			.field("store_attached", &self.store.is_some())
			.finish()
	}
}
