//! JSON-file credential store.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use estatedesk_core::error::StorageError;
use estatedesk_core::{Credential, CredentialStore, Result, UserIdentity};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk representation of the stored credential.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserIdentity>,
    saved_at: DateTime<Utc>,
}

/// A credential store backed by a single JSON file.
///
/// The credential survives process restarts until [`clear`](CredentialStore::clear)
/// removes the file. Writes go to a temporary file and are renamed into
/// place; a sidecar `.lock` file serializes access between processes.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store that keeps its credential at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the stored credential was last written, if one is stored.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let _lock = self.lock(false)?;
        Ok(self.read()?.map(|stored| stored.saved_at))
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Take the sidecar lock; released when the returned file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.io_error(&lock_path, e))?;

        let locked = if exclusive {
            lock_file.lock_exclusive()
        } else {
            lock_file.lock_shared()
        };
        locked.map_err(|e| self.io_error(&lock_path, e))?;

        Ok(lock_file)
    }

    fn read(&self) -> Result<Option<StoredCredential>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        let stored = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(stored))
    }

    /// Atomically replace the credential file. Callers hold the exclusive lock.
    fn write(&self, stored: &StoredCredential) -> Result<()> {
        let json = serde_json::to_string_pretty(stored).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).map_err(|e| self.io_error(&temp_path, e))?;

        // Set restrictive permissions before the credential becomes visible (Unix only)
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| self.io_error(&temp_path, e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(&self.path, e))
    }

    fn io_error(&self, path: &Path, err: std::io::Error) -> estatedesk_core::Error {
        StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>> {
        let _lock = self.lock(false)?;
        Ok(self.read()?.map(|stored| Credential::new(stored.token)))
    }

    #[instrument(skip(self, credential), fields(path = %self.path.display()))]
    fn set(&self, credential: Credential) -> Result<()> {
        let _lock = self.lock(true)?;

        // An unreadable file is replaced outright; only a readable one keeps its user.
        let user = self.read().ok().flatten().and_then(|stored| stored.user);
        self.write(&StoredCredential {
            token: credential.as_str().to_string(),
            user,
            saved_at: Utc::now(),
        })?;

        debug!("Stored credential");
        Ok(())
    }

    fn identity(&self) -> Result<Option<UserIdentity>> {
        let _lock = self.lock(false)?;
        Ok(self.read()?.and_then(|stored| stored.user))
    }

    /// The identity is kept inside the credential file, so without a stored
    /// credential there is nothing to attach it to and it is dropped.
    #[instrument(skip(self, identity), fields(path = %self.path.display()))]
    fn set_identity(&self, identity: Option<UserIdentity>) -> Result<()> {
        let _lock = self.lock(true)?;

        let Some(mut stored) = self.read()? else {
            debug!("No credential stored; identity not saved");
            return Ok(());
        };
        stored.user = identity;
        self.write(&stored)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        let _lock = self.lock(true)?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed credential file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use estatedesk_core::Error;
    use tempfile::TempDir;

    use super::*;

    fn store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credential.json"));
        (dir, store)
    }

    #[test]
    fn empty_store_returns_none() {
        let (_dir, store) = store();
        assert!(store.get().unwrap().is_none());
        assert!(store.saved_at().unwrap().is_none());
    }

    #[test]
    fn set_then_get_survives_new_instance() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();

        let reopened = FileCredentialStore::new(store.path());
        assert_eq!(reopened.get().unwrap().unwrap(), "t1");
        assert!(reopened.saved_at().unwrap().is_some());
    }

    #[test]
    fn set_overwrites() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();
        store.set(Credential::new("t2")).unwrap();
        assert_eq!(store.get().unwrap().unwrap(), "t2");
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().unwrap().is_none());

        store.clear().unwrap();
    }

    fn asha() -> UserIdentity {
        UserIdentity {
            id: "u1".into(),
            name: Some("Asha".into()),
            email: None,
            role: Some("manager".into()),
        }
    }

    #[test]
    fn identity_persists_across_instances_and_renewal() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();
        store.set_identity(Some(asha())).unwrap();

        store.set(Credential::new("t2")).unwrap();

        let reopened = FileCredentialStore::new(store.path());
        assert_eq!(reopened.get().unwrap().unwrap(), "t2");
        assert_eq!(reopened.identity().unwrap(), Some(asha()));
    }

    #[test]
    fn clear_removes_identity() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();
        store.set_identity(Some(asha())).unwrap();

        store.clear().unwrap();
        assert!(store.identity().unwrap().is_none());
    }

    #[test]
    fn identity_without_credential_is_dropped() {
        let (_dir, store) = store();
        store.set_identity(Some(asha())).unwrap();

        assert!(!store.path().exists());
        assert!(store.identity().unwrap().is_none());
    }

    #[test]
    fn file_without_user_field_loads() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"token":"t1","saved_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(store.get().unwrap().unwrap(), "t1");
        assert!(store.identity().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let err = store.get().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));

        store.set(Credential::new("t1")).unwrap();
        assert_eq!(store.get().unwrap().unwrap(), "t1");
    }

    #[cfg(unix)]
    #[test]
    fn credential_file_is_private() {
        let (_dir, store) = store();
        store.set(Credential::new("t1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
