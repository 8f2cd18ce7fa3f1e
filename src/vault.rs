//! The extraction engine: locate, snapshot, read, decrypt.
//!
//! Stores are processed sequentially: each one is snapshotted, fully
//! drained of rows, and cleaned up before decryption of its records and
//! before the next store is touched. Unique snapshot paths mean callers
//! may also process distinct stores from separate threads.

use std::path::{Path, PathBuf};

use crate::cookie::Cookie;
use crate::decrypt::Decryptor;
use crate::error::VaultError;
use crate::locator;
use crate::rowreader;
use crate::snapshot::Snapshot;

/// Cookie extraction engine for Chromium-family profile trees.
pub struct ChromeVault {
    home: PathBuf,
    decryptor: Decryptor,
}

impl ChromeVault {
    /// Engine for the current user's home directory and host OS.
    ///
    /// The only fatal path is Windows master key resolution: a missing or
    /// unparsable key configuration means nothing on this host can ever be
    /// decrypted, and that is an error the caller must see. Everything
    /// else degrades at read time.
    pub fn new() -> Result<Self, VaultError> {
        let home = default_home().ok_or(VaultError::NoHomeDirectory)?;
        let decryptor = Decryptor::for_host(&home)?;
        Ok(ChromeVault { home, decryptor })
    }

    /// Engine over an explicit home root and decryptor, for tools that
    /// examine a foreign profile tree (mounted image, seized disk).
    pub fn with_parts(home: PathBuf, decryptor: Decryptor) -> Self {
        ChromeVault { home, decryptor }
    }

    /// Every cookie store under the engine's home root, deduplicated.
    ///
    /// A home with no browser profiles yields an empty list, not an error.
    pub fn list_cookie_stores(&self) -> Vec<PathBuf> {
        locator::locate_cookie_stores(&self.home)
    }

    /// Extract cookies from every discovered store.
    ///
    /// `domain_filter` restricts the scan to rows whose domain contains
    /// the given substring. Cookies that fail to decrypt are returned in
    /// their [`Cookie::Encrypted`] form.
    pub fn read_cookies(&self, domain_filter: Option<&str>) -> Vec<Cookie> {
        let mut cookies = Vec::new();
        for store in self.list_cookie_stores() {
            cookies.extend(self.read_store(&store, domain_filter));
        }
        cookies
    }

    /// Extract cookies from one store file.
    ///
    /// Store-level failures (vanished file, corrupt database, lock
    /// timeout) are logged and yield an empty result; a partially broken
    /// profile must not abort the rest of the run.
    pub fn read_store(&self, store: &Path, domain_filter: Option<&str>) -> Vec<Cookie> {
        let snapshot = match Snapshot::of(store) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(store = %store.display(), error = %e, "failed to snapshot cookie store");
                return Vec::new();
            }
        };

        let records = rowreader::read_records(snapshot.path(), store, domain_filter);
        // The snapshot has served its purpose once the rows are drained;
        // Drop covers the early-return paths above.
        snapshot.cleanup();

        records
            .into_iter()
            .map(|record| match self.decryptor.decrypt(&record) {
                Ok(value) => Cookie::Decrypted { record, value },
                Err(e) => {
                    tracing::debug!(
                        cookie = %record.name,
                        error = %e,
                        "cookie decryption failed, keeping encrypted form"
                    );
                    Cookie::Encrypted(record)
                }
            })
            .collect()
    }
}

fn default_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromedb::{encryption, paths};
    use crate::decrypt::{derive_key, MasterKeyMaterial};
    use rusqlite::Connection;
    use std::fs;
    use tempfile::tempdir;

    fn seal_linux_value(plaintext: &[u8]) -> Vec<u8> {
        use boring::symm::{encrypt, Cipher};

        let key = derive_key(encryption::V10_PASSWORD.as_bytes(), encryption::LINUX_ITERATIONS);
        let mut sealed = encryption::V10_PREFIX.to_vec();
        sealed.extend_from_slice(
            &encrypt(Cipher::aes_128_cbc(), &key, Some(&encryption::AES_CBC_IV), plaintext)
                .unwrap(),
        );
        sealed
    }

    fn write_store(home: &Path, rows: &[(&str, Vec<u8>, &str)]) -> PathBuf {
        let profile = home.join(paths::LINUX_CHROMIUM).join("Default");
        fs::create_dir_all(&profile).unwrap();
        let db = profile.join("Cookies");
        let conn = Connection::open(&db).unwrap();
        conn.execute(
            "CREATE TABLE cookies (name TEXT, encrypted_value BLOB, path TEXT,
             host_key TEXT, expires_utc INTEGER, is_secure INTEGER, is_httponly INTEGER)",
            [],
        )
        .unwrap();
        for (name, value, host) in rows {
            conn.execute(
                "INSERT INTO cookies VALUES (?1, ?2, '/', ?3, 0, 1, 1)",
                rusqlite::params![name, value, host],
            )
            .unwrap();
        }
        db
    }

    fn linux_vault(home: &Path) -> ChromeVault {
        ChromeVault::with_parts(
            home.to_path_buf(),
            Decryptor::with_material(MasterKeyMaterial::LinuxPassword(
                encryption::V10_PASSWORD.to_string(),
            )),
        )
    }

    #[test]
    fn test_end_to_end_decrypts_matching_domain() {
        let home = tempdir().unwrap();
        write_store(home.path(), &[("sid", seal_linux_value(b"abc123"), "example.com")]);

        let vault = linux_vault(home.path());
        let cookies = vault.read_cookies(Some("example.com"));
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].is_decrypted());
        assert_eq!(cookies[0].name(), "sid");
        assert_eq!(cookies[0].value(), Some("abc123"));
    }

    #[test]
    fn test_end_to_end_filter_mismatch_is_empty() {
        let home = tempdir().unwrap();
        write_store(home.path(), &[("sid", seal_linux_value(b"abc123"), "example.com")]);

        let vault = linux_vault(home.path());
        assert!(vault.read_cookies(Some("nomatch.com")).is_empty());
    }

    #[test]
    fn test_undecryptable_cookie_stays_encrypted() {
        let home = tempdir().unwrap();
        write_store(home.path(), &[("sid", b"v10garbage!".to_vec(), "example.com")]);

        let vault = linux_vault(home.path());
        let cookies = vault.read_cookies(None);
        assert_eq!(cookies.len(), 1);
        assert!(!cookies[0].is_decrypted());
        assert_eq!(cookies[0].record().encrypted_value, b"v10garbage!");
    }

    #[test]
    fn test_missing_store_reads_empty() {
        let home = tempdir().unwrap();
        let vault = linux_vault(home.path());
        assert!(vault.read_store(&home.path().join("absent"), None).is_empty());
    }

    #[test]
    fn test_home_without_profiles_lists_nothing() {
        let home = tempdir().unwrap();
        let vault = linux_vault(home.path());
        assert!(vault.list_cookie_stores().is_empty());
        assert!(vault.read_cookies(None).is_empty());
    }
}
