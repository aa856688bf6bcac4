//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey},
	store::{CredentialStore, StoreError},
};

/// Keeps credentials in-process behind a read/write lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<CredentialKey, Credential>>>);
impl MemoryStore {
	/// Creates a store pre-populated with one credential.
	pub fn with_credential(key: CredentialKey, credential: Credential) -> Self {
		let store = Self::default();

		store.0.write().insert(key, credential);

		store
	}

	/// Number of stored credentials.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn store(&self, key: &CredentialKey, credential: Credential) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), credential);

		Ok(())
	}

	fn delete(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.0.write().remove(key))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_replaces_previous_credential() {
		let key = CredentialKey::new("rider").expect("Key fixture should be valid.");
		let first = Credential::builder().access_token("first").build().expect("First credential should build.");
		let second =
			Credential::builder().access_token("second").build().expect("Second credential should build.");
		let store = MemoryStore::with_credential(key.clone(), first);

		store.store(&key, second).expect("Replacing a credential should succeed.");

		let loaded = store.load(&key).expect("Load should succeed.").expect("Credential should exist.");

		assert_eq!(loaded.access_token.expose(), "second");
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn clones_share_state() {
		let key = CredentialKey::new("rider").expect("Key fixture should be valid.");
		let store = MemoryStore::default();
		let clone = store.clone();

		clone
			.store(&key, Credential::builder().access_token("shared").build().expect("Credential should build."))
			.expect("Store should accept writes.");

		assert!(!store.is_empty());
		assert!(store.delete(&key).expect("Delete should succeed.").is_some());
		assert!(clone.is_empty());
	}
}
