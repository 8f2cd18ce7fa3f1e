//! Cookie representations for the extraction pipeline.

use std::fmt;
use std::path::PathBuf;

use time::OffsetDateTime;

/// One encrypted cookie row as read from a store.
///
/// Immutable after construction. `encrypted_value`, `name` and `domain` are
/// always non-empty; rows violating that are dropped by the row reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub name: String,
    pub encrypted_value: Vec<u8>,
    pub expires: Option<OffsetDateTime>,
    pub path: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    /// The live store file this row came from (not the snapshot).
    pub source_store: PathBuf,
}

impl CookieRecord {
    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        match self.expires {
            Some(expiry) => expiry < current_time,
            None => false,
        }
    }
}

/// A cookie is either still encrypted or carries its recovered plaintext.
///
/// Decryption is a pure transform from the first variant to the second; the
/// decrypted form keeps the original ciphertext for audit. A failed decrypt
/// leaves the cookie in the `Encrypted` variant rather than substituting a
/// guessed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cookie {
    Encrypted(CookieRecord),
    Decrypted { record: CookieRecord, value: String },
}

impl Cookie {
    pub fn record(&self) -> &CookieRecord {
        match self {
            Cookie::Encrypted(record) => record,
            Cookie::Decrypted { record, .. } => record,
        }
    }

    pub fn name(&self) -> &str {
        &self.record().name
    }

    pub fn domain(&self) -> &str {
        &self.record().domain
    }

    /// Recovered plaintext, if decryption succeeded.
    pub fn value(&self) -> Option<&str> {
        match self {
            Cookie::Encrypted(_) => None,
            Cookie::Decrypted { value, .. } => Some(value),
        }
    }

    pub fn is_decrypted(&self) -> bool {
        matches!(self, Cookie::Decrypted { .. })
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cookie::Encrypted(record) => write!(f, "Cookie [name={} (encrypted)]", record.name),
            Cookie::Decrypted { record, value } => {
                write!(f, "Cookie [name={}, value={}]", record.name, value)
            }
        }
    }
}
