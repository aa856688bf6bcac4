//! Credential persistence keyed by session slot, plus the built-in store implementations.
//!
//! Reads are synchronous and served from memory so the signing path never awaits I/O. Writes
//! happen only from the refresh path, which already holds the refresh guard.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey},
};

/// Storage backend contract for the current [`Credential`] of each session key.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the credential stored under `key`, if any.
	fn load(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError>;

	/// Persists or replaces the credential stored under `key`.
	fn store(&self, key: &CredentialKey, credential: Credential) -> Result<(), StoreError>;

	/// Removes and returns the credential stored under `key`.
	fn delete(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError>;
}
impl<S> CredentialStore for Arc<S>
where
	S: ?Sized + CredentialStore,
{
	fn load(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		(**self).load(key)
	}

	fn store(&self, key: &CredentialKey, credential: Credential) -> Result<(), StoreError> {
		(**self).store(key, credential)
	}

	fn delete(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		(**self).delete(key)
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn shared_stores_delegate_through_arc() {
		let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
		let key = CredentialKey::new("default").expect("Key fixture should be valid.");
		let credential = Credential::builder()
			.access_token("access")
			.build()
			.expect("Credential fixture should build.");

		store.store(&key, credential).expect("Arc store should accept writes.");

		let loaded = store.load(&key).expect("Arc store should read.").expect("Credential should exist.");

		assert_eq!(loaded.access_token.expose(), "access");
		assert!(store.delete(&key).expect("Arc store should delete.").is_some());
		assert!(store.load(&key).expect("Arc store should read.").is_none());
	}

	#[test]
	fn store_error_renders_message() {
		let error = StoreError::Serialization { message: "trailing comma".into() };

		assert!(error.to_string().contains("trailing comma"));
	}
}
