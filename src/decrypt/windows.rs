//! Windows master key resolution.
//!
//! The browser keeps its AES-256 master key in the per-profile `Local
//! State` JSON file, base64-encoded, prefixed with a 5-byte `DPAPI` marker
//! and wrapped by the OS protected-data API bound to the current user's
//! login. Unwrapping goes through `CryptUnprotectData`; the caller never
//! handles DPAPI internals, only ciphertext-in / key-out.
//!
//! Unlike the per-cookie pipelines, a failure here is fatal to engine
//! construction: without the key configuration nothing on this host can be
//! decrypted.

use std::path::PathBuf;

use base64::Engine;
use serde::Deserialize;

use crate::chromedb::encryption::DPAPI_KEY_PREFIX;
use crate::chromedb::paths::WINDOWS_LOCAL_STATE;
use crate::error::VaultError;

#[derive(Deserialize)]
struct LocalState {
    os_crypt: Option<OsCryptSection>,
}

#[derive(Deserialize)]
struct OsCryptSection {
    encrypted_key: Option<String>,
}

/// Extract the DPAPI-wrapped key bytes from `Local State` JSON.
///
/// Returns the wrapped key with the `DPAPI` marker already stripped, ready
/// for the unprotect call.
pub fn parse_encrypted_key(local_state_json: &str) -> Result<Vec<u8>, VaultError> {
    let state: LocalState = serde_json::from_str(local_state_json)?;
    let encrypted_b64 = state
        .os_crypt
        .and_then(|section| section.encrypted_key)
        .ok_or(VaultError::MissingEncryptedKey)?;

    let wrapped = base64::engine::general_purpose::STANDARD
        .decode(encrypted_b64)
        .map_err(|e| VaultError::InvalidKeyEncoding(e.to_string()))?;

    if !wrapped.starts_with(DPAPI_KEY_PREFIX) {
        return Err(VaultError::InvalidKeyEncoding(
            "missing DPAPI marker".to_string(),
        ));
    }
    Ok(wrapped[DPAPI_KEY_PREFIX.len()..].to_vec())
}

/// Resolves the master key by reading `Local State` under a home root and
/// unwrapping it through the protected-data API.
pub struct LocalStateKeySource {
    home: PathBuf,
}

impl LocalStateKeySource {
    pub fn new(home: PathBuf) -> Self {
        LocalStateKeySource { home }
    }

    pub fn local_state_path(&self) -> PathBuf {
        self.home.join(WINDOWS_LOCAL_STATE)
    }
}

#[cfg(target_os = "windows")]
impl crate::decrypt::KeySource for LocalStateKeySource {
    fn resolve(&self) -> Result<crate::decrypt::MasterKeyMaterial, VaultError> {
        let path = self.local_state_path();
        let json = std::fs::read_to_string(&path)
            .map_err(|source| VaultError::LocalStateRead { path: path.clone(), source })?;
        let wrapped = parse_encrypted_key(&json)?;
        let unwrapped = unprotect(&wrapped)?;

        let key: [u8; crate::chromedb::encryption::MASTER_KEY_LEN] =
            unwrapped.try_into().map_err(|_| {
                VaultError::KeyUnprotectFailed("unexpected key length from unprotect".to_string())
            })?;
        Ok(crate::decrypt::MasterKeyMaterial::WindowsAesKey(key))
    }
}

/// DPAPI unprotect: ciphertext in, plaintext out, bound to the current
/// user's login credentials.
#[cfg(target_os = "windows")]
fn unprotect(wrapped: &[u8]) -> Result<Vec<u8>, VaultError> {
    use windows::Win32::Foundation::HLOCAL;
    use windows::Win32::Security::Cryptography::{CryptUnprotectData, CRYPT_INTEGER_BLOB};
    use windows::Win32::System::Memory::LocalFree;

    let mut blob_in = CRYPT_INTEGER_BLOB {
        cbData: wrapped.len() as u32,
        pbData: wrapped.as_ptr() as *mut u8,
    };
    let mut blob_out = CRYPT_INTEGER_BLOB::default();

    unsafe {
        CryptUnprotectData(&mut blob_in, None, None, None, None, 0, &mut blob_out)
            .map_err(|e| VaultError::KeyUnprotectFailed(e.to_string()))?;

        let out = std::slice::from_raw_parts(blob_out.pbData, blob_out.cbData as usize).to_vec();
        LocalFree(HLOCAL(blob_out.pbData as *mut _));
        Ok(out)
    }
}
