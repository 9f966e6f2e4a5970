//! Traits for the collaborators the client depends on.

mod credential_store;
mod navigator;

pub use credential_store::{CredentialStore, MemoryCredentialStore};
pub use navigator::{Navigator, StaticNavigator};
