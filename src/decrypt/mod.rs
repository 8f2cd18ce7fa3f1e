//! Cookie value decryption.
//!
//! Three incompatible schemes exist, one per operating system:
//!
//! - **Windows**: AES-256-GCM under a DPAPI-unwrapped master key; the
//!   ciphertext carries a 3-byte version marker, a 12-byte nonce and a
//!   trailing 128-bit tag.
//! - **macOS**: AES-128-CBC under a key derived from the keychain password
//!   (PBKDF2-HMAC-SHA1, salt `saltysalt`, 1003 iterations).
//! - **Linux**: same CBC pipeline, 1 iteration, fixed well-known password.
//!
//! Rather than branching on the host OS in the hot path, the scheme is
//! selected by the [`MasterKeyMaterial`] variant resolved once at startup
//! through a [`KeySource`]. The pipelines themselves are host-independent,
//! so any of them can be exercised on any platform given the right
//! material.

pub mod linux;
pub mod macos;
pub mod windows;

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chromedb::encryption::{
    AES_CBC_IV, CHROME_SALT, DERIVED_KEY_LEN, GCM_NONCE_LEN, GCM_TAG_LEN, LINUX_ITERATIONS,
    MACOS_ITERATIONS, V10_PREFIX,
};
use crate::cookie::CookieRecord;
use crate::error::VaultError;

/// Why a single cookie failed to decrypt.
///
/// Cookie-level failures are recoverable: the caller keeps the encrypted
/// variant and the run continues.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum DecryptError {
    #[error("no master key material available")]
    MissingKey,
    #[error("ciphertext too short for its scheme")]
    Truncated,
    #[error("cipher rejected the ciphertext")]
    BadCiphertext,
    #[error("plaintext is not valid UTF-8")]
    NotUtf8,
}

/// Per-OS secret material, resolved once per process.
#[derive(Zeroize, ZeroizeOnDrop)]
pub enum MasterKeyMaterial {
    /// Pre-unwrapped AES-256 key from the Windows protected-data API.
    WindowsAesKey([u8; 32]),
    /// Keychain password string on macOS; the AES key is derived per the
    /// CBC scheme parameters.
    DarwinPassword(String),
    /// Fixed well-known password on Linux.
    LinuxPassword(String),
}

impl fmt::Debug for MasterKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterKeyMaterial::WindowsAesKey(_) => f.write_str("WindowsAesKey(..)"),
            MasterKeyMaterial::DarwinPassword(_) => f.write_str("DarwinPassword(..)"),
            MasterKeyMaterial::LinuxPassword(_) => f.write_str("LinuxPassword(..)"),
        }
    }
}

/// Strategy for obtaining master key material on one platform.
pub trait KeySource: Send + Sync {
    fn resolve(&self) -> Result<MasterKeyMaterial, VaultError>;
}

/// Decrypts cookie records under lazily resolved, memoized key material.
///
/// Resolution happens at most once; a failed resolution is also memoized,
/// after which every decrypt reports [`DecryptError::MissingKey`] instead
/// of retrying the secret store.
pub struct Decryptor {
    source: Option<Box<dyn KeySource>>,
    material: OnceLock<Option<MasterKeyMaterial>>,
}

impl Decryptor {
    pub fn new(source: Box<dyn KeySource>) -> Self {
        Decryptor { source: Some(source), material: OnceLock::new() }
    }

    /// Build a decryptor with already-resolved material.
    pub fn with_material(material: MasterKeyMaterial) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Some(material));
        Decryptor { source: None, material: cell }
    }

    /// Select the scheme for the current host.
    ///
    /// On Windows the master key is unwrapped eagerly and a failure is
    /// fatal: without the key configuration the engine cannot operate at
    /// all. The other platforms resolve lazily on first decrypt.
    pub fn for_host(home: &Path) -> Result<Self, VaultError> {
        #[cfg(target_os = "windows")]
        {
            let source = windows::LocalStateKeySource::new(home.to_path_buf());
            let material = source.resolve()?;
            Ok(Decryptor::with_material(material))
        }

        #[cfg(target_os = "macos")]
        {
            let _ = home;
            Ok(Decryptor::new(Box::new(macos::KeychainSource::chrome())))
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let _ = home;
            Ok(Decryptor::new(Box::new(linux::FixedPasswordSource)))
        }
    }

    fn material(&self) -> Option<&MasterKeyMaterial> {
        self.material
            .get_or_init(|| {
                let source = self.source.as_ref()?;
                match source.resolve() {
                    Ok(material) => Some(material),
                    Err(e) => {
                        tracing::warn!(error = %e, "master key resolution failed; cookies will stay encrypted");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Decrypt one record. Pure with respect to the record: the input is
    /// never mutated, the plaintext is returned separately.
    pub fn decrypt(&self, record: &CookieRecord) -> Result<String, DecryptError> {
        let material = self.material().ok_or(DecryptError::MissingKey)?;
        decrypt_value(&record.encrypted_value, material)
    }
}

/// Run the cipher pipeline selected by `material` over one encrypted value.
pub fn decrypt_value(
    encrypted: &[u8],
    material: &MasterKeyMaterial,
) -> Result<String, DecryptError> {
    match material {
        MasterKeyMaterial::WindowsAesKey(key) => decrypt_gcm(key, encrypted),
        MasterKeyMaterial::DarwinPassword(password) => {
            decrypt_cbc(password, MACOS_ITERATIONS, encrypted)
        }
        MasterKeyMaterial::LinuxPassword(password) => {
            decrypt_cbc(password, LINUX_ITERATIONS, encrypted)
        }
    }
}

/// Strip the `v10` marker iff it is present as an exact byte prefix.
///
/// Unprefixed ciphertext (the pre-AES scheme, or foreign data) passes
/// through unmodified.
pub fn strip_version_prefix(encrypted: &[u8]) -> &[u8] {
    if encrypted.starts_with(V10_PREFIX) {
        &encrypted[V10_PREFIX.len()..]
    } else {
        encrypted
    }
}

/// Derive the CBC scheme's AES-128 key from a password.
///
/// Deterministic: the same (password, salt, iterations) always yields the
/// same key.
pub fn derive_key(password: &[u8], iterations: u32) -> [u8; DERIVED_KEY_LEN] {
    use boring::hash::MessageDigest;
    use boring::pkcs5::pbkdf2_hmac;

    let mut key = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac(
        password,
        CHROME_SALT,
        iterations as usize,
        MessageDigest::sha1(),
        &mut key,
    )
    .expect("PBKDF2 should not fail");
    key
}

fn decrypt_cbc(password: &str, iterations: u32, encrypted: &[u8]) -> Result<String, DecryptError> {
    let payload = strip_version_prefix(encrypted);
    let mut key = derive_key(password.as_bytes(), iterations);
    let result = decrypt_aes_cbc(&key, &AES_CBC_IV, payload);
    key.zeroize();
    let plaintext = result?;
    String::from_utf8(plaintext).map_err(|_| DecryptError::NotUtf8)
}

fn decrypt_aes_cbc(
    key: &[u8; DERIVED_KEY_LEN],
    iv: &[u8; 16],
    data: &[u8],
) -> Result<Vec<u8>, DecryptError> {
    use boring::symm::{Cipher, Crypter, Mode};

    // CBC ciphertext is always a whole number of blocks.
    if data.is_empty() || data.len() % 16 != 0 {
        return Err(DecryptError::Truncated);
    }

    let cipher = Cipher::aes_128_cbc();
    let mut crypter =
        Crypter::new(cipher, Mode::Decrypt, key, Some(iv)).map_err(|_| DecryptError::BadCiphertext)?;
    crypter.pad(true); // PKCS#7 padding

    let mut plaintext = vec![0u8; data.len() + 16];
    let count = crypter.update(data, &mut plaintext).map_err(|_| DecryptError::BadCiphertext)?;
    let rest = crypter
        .finalize(&mut plaintext[count..])
        .map_err(|_| DecryptError::BadCiphertext)?;
    plaintext.truncate(count + rest);
    Ok(plaintext)
}

fn decrypt_gcm(key: &[u8; 32], encrypted: &[u8]) -> Result<String, DecryptError> {
    use boring::symm::{decrypt_aead, Cipher};

    // Version marker is dropped without inspection on this scheme; the
    // nonce sits between it and the ciphertext, the tag trails.
    if encrypted.len() < V10_PREFIX.len() + GCM_NONCE_LEN + GCM_TAG_LEN {
        return Err(DecryptError::Truncated);
    }
    let payload = &encrypted[V10_PREFIX.len()..];
    let (nonce, rest) = payload.split_at(GCM_NONCE_LEN);
    let (ciphertext, tag) = rest.split_at(rest.len() - GCM_TAG_LEN);

    let plaintext = decrypt_aead(Cipher::aes_256_gcm(), key, Some(nonce), &[], ciphertext, tag)
        .map_err(|_| DecryptError::BadCiphertext)?;
    String::from_utf8(plaintext).map_err(|_| DecryptError::NotUtf8)
}
