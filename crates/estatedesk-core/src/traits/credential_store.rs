//! Credential store trait and in-memory implementation.

use std::sync::RwLock;

use crate::Result;
use crate::credential::Credential;
use crate::error::StorageError;
use crate::identity::UserIdentity;

/// Holds the current bearer credential and the user it belongs to.
///
/// Calls are synchronous and must not block for long: the client reads the
/// store on every outbound request. Writes are last-write-wins.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, if any.
    fn get(&self) -> Result<Option<Credential>>;

    /// Replace the stored credential. A stored identity is kept, since a
    /// renewed credential still belongs to the same user.
    fn set(&self, credential: Credential) -> Result<()>;

    /// Returns the identity saved at login, if any.
    fn identity(&self) -> Result<Option<UserIdentity>>;

    /// Replace the saved identity.
    fn set_identity(&self, identity: Option<UserIdentity>) -> Result<()>;

    /// Remove the stored credential and identity.
    fn clear(&self) -> Result<()>;
}

/// A process-local credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
    identity: RwLock<Option<UserIdentity>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
            identity: RwLock::new(None),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>> {
        let guard = self
            .credential
            .read()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, credential: Credential) -> Result<()> {
        let mut guard = self
            .credential
            .write()
            .map_err(|_| StorageError::Poisoned)?;
        *guard = Some(credential);
        Ok(())
    }

    fn identity(&self) -> Result<Option<UserIdentity>> {
        let guard = self.identity.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set_identity(&self, identity: Option<UserIdentity>) -> Result<()> {
        *self.identity.write().map_err(|_| StorageError::Poisoned)? = identity;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .credential
            .write()
            .map_err(|_| StorageError::Poisoned)?;
        *guard = None;
        *self.identity.write().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}
