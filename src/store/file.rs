//! File-backed [`CredentialStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey},
	store::{CredentialStore, StoreError},
};

type Snapshot = HashMap<CredentialKey, Credential>;

/// Serves reads from memory and rewrites a JSON snapshot after each mutation.
///
/// Snapshots are written to a sibling `.tmp` file and renamed over the target, so readers never
/// observe a partially written file.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(HashMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		let ordered = contents.iter().collect::<BTreeMap<_, _>>();
		let serialized =
			serde_json::to_vec_pretty(&ordered).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let tmp_path = self.path.with_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		Ok(self.inner.read().get(key).cloned())
	}

	fn store(&self, key: &CredentialKey, credential: Credential) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		next.insert(key.to_owned(), credential);
		self.persist_locked(&next)?;

		*guard = next;

		Ok(())
	}

	fn delete(&self, key: &CredentialKey) -> Result<Option<Credential>, StoreError> {
		let mut guard = self.inner.write();

		if !guard.contains_key(key) {
			return Ok(None);
		}

		let mut next = guard.clone();
		let removed = next.remove(key);

		self.persist_locked(&next)?;

		*guard = next;

		Ok(removed)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::auth::ScopeSet;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"rides_auth_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn fixture() -> (CredentialKey, Credential) {
		let key = CredentialKey::new("rider-demo").expect("Failed to build key fixture.");
		let credential = Credential::builder()
			.access_token("access-token")
			.refresh_token("refresh-token")
			.scope(ScopeSet::new(["profile", "request"]).expect("Failed to build scope fixture."))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Failed to build file-store credential.");

		(key, credential)
	}

	#[test]
	fn store_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (key, credential) = fixture();

		store.store(&key, credential.clone()).expect("Failed to store fixture credential.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let loaded = reopened
			.load(&key)
			.expect("Failed to load fixture credential.")
			.expect("File store lost credential after reopen.");

		assert_eq!(loaded.access_token.expose(), credential.access_token.expose());
		assert_eq!(loaded.expires_at, credential.expires_at);
		assert_eq!(loaded.scope, credential.scope);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn delete_persists_removal() {
		let path = temp_path("delete");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (key, credential) = fixture();

		store.store(&key, credential).expect("Failed to store fixture credential.");
		assert!(store.delete(&key).expect("Delete should succeed.").is_some());

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(reopened.load(&key).expect("Load should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_leaves_memory_untouched() {
		let path = temp_path("unwritable");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (key, credential) = fixture();
		let blocker = path.with_extension("tmp");

		// A directory where the temporary snapshot belongs makes `File::create` fail.
		fs::create_dir(&blocker).expect("Failed to create blocking directory.");

		let err = store.store(&key, credential).expect_err("Persist failure must surface.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert!(store.load(&key).expect("Load should succeed.").is_none());
		assert!(!path.exists());

		fs::remove_dir(&blocker).unwrap_or_else(|e| {
			panic!("Failed to remove blocking directory {}: {e}", blocker.display())
		});
	}

	#[test]
	fn failed_delete_keeps_the_credential() {
		let path = temp_path("undeletable");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (key, credential) = fixture();
		let blocker = path.with_extension("tmp");

		store.store(&key, credential).expect("Failed to store fixture credential.");
		fs::create_dir(&blocker).expect("Failed to create blocking directory.");

		store.delete(&key).expect_err("Persist failure must surface.");

		assert!(store.load(&key).expect("Load should succeed.").is_some());

		fs::remove_dir(&blocker).unwrap_or_else(|e| {
			panic!("Failed to remove blocking directory {}: {e}", blocker.display())
		});
		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path("corrupt");

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshots must be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
