//! Thread-safe in-memory [`CredentialStore`] for tests, demos, and headless runs.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreFuture, StoredCredential},
};

type StoreMap = Arc<RwLock<HashMap<String, StoredCredential>>>;

/// Keeps credentials in-process; clones share the same map, so a "fresh" client built on
/// a clone observes what an earlier client persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of keys currently holding a credential.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no credential is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn load_now(map: StoreMap, key: String) -> Option<StoredCredential> {
		map.read().get(&key).cloned()
	}

	fn save_now(map: StoreMap, key: String, credential: StoredCredential) {
		map.write().insert(key, credential);
	}

	fn clear_now(map: StoreMap, key: String) -> Option<StoredCredential> {
		map.write().remove(&key)
	}
}
impl CredentialStore for MemoryStore {
	fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StoredCredential>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::load_now(map, key)) })
	}

	fn save<'a>(&'a self, key: &'a str, credential: StoredCredential) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move {
			Self::save_now(map, key, credential);

			Ok(())
		})
	}

	fn clear<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StoredCredential>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::clear_now(map, key)) })
	}
}
