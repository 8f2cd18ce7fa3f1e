//! Error types for store access and master key resolution.
//!
//! Only construction-time failures (a missing or unparsable key
//! configuration) surface to callers. Store- and row-level failures are
//! logged and degrade to fewer cookies; per-cookie decryption failures are
//! reported through [`crate::decrypt::DecryptError`] and keep the cookie in
//! its encrypted form.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no home directory for the current user")]
    NoHomeDirectory,

    #[error("failed to read key configuration at {path}: {source}")]
    LocalStateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key configuration is not valid JSON: {0}")]
    LocalStateParse(#[from] serde_json::Error),

    #[error("key configuration has no os_crypt.encrypted_key entry")]
    MissingEncryptedKey,

    #[error("encrypted master key is malformed: {0}")]
    InvalidKeyEncoding(String),

    #[error("protected-data unwrap failed: {0}")]
    KeyUnprotectFailed(String),

    #[error("system keychain unavailable")]
    KeychainUnavailable,

    #[error("cookie database is locked")]
    DatabaseLocked,

    #[error("cookie database error: {message}")]
    Database { message: String },

    #[error("failed to snapshot cookie store: {0}")]
    Snapshot(#[from] std::io::Error),
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ffi::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ffi::ErrorCode::DatabaseLocked =>
            {
                VaultError::DatabaseLocked
            }
            _ => VaultError::Database { message: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_locked() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(VaultError::from(busy), VaultError::DatabaseLocked));
    }

    #[test]
    fn test_other_sqlite_errors_keep_message() {
        let err = rusqlite::Error::InvalidQuery;
        match VaultError::from(err) {
            VaultError::Database { message } => assert!(!message.is_empty()),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
