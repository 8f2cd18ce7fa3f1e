//! Linux key material.
//!
//! The POSIX build without a keyring integration encrypts under a fixed,
//! publicly known password shared across every install on the platform. No
//! external secret store is consulted.

use crate::chromedb::encryption::V10_PASSWORD;
use crate::decrypt::{KeySource, MasterKeyMaterial};
use crate::error::VaultError;

/// Yields the well-known fixed password. Infallible in practice.
pub struct FixedPasswordSource;

impl KeySource for FixedPasswordSource {
    fn resolve(&self) -> Result<MasterKeyMaterial, VaultError> {
        Ok(MasterKeyMaterial::LinuxPassword(V10_PASSWORD.to_string()))
    }
}
