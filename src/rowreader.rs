//! Raw encrypted-cookie row extraction from a store snapshot.
//!
//! The snapshot is opened read-only and scanned either in full or filtered
//! to rows whose `host_key` contains a caller-supplied substring. The
//! `secure` and `httponly` flags have carried two different column names
//! across schema versions, so extraction tries the primary name and falls
//! back to the alternate.
//!
//! Failure policy: a malformed row is logged and skipped; a store that
//! cannot be opened or queried at all yields an empty result, never an
//! error, so one corrupt profile cannot abort a whole collection run.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, Row};

use crate::chromedb;
use crate::cookie::CookieRecord;
use crate::error::VaultError;

/// Bounded wait before a busy database is treated as unreadable.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Read every encrypted-cookie row from `snapshot`.
///
/// `source_store` is recorded on each [`CookieRecord`] so callers can trace
/// a cookie back to the live file it came from.
pub fn read_records(
    snapshot: &Path,
    source_store: &Path,
    domain_filter: Option<&str>,
) -> Vec<CookieRecord> {
    match try_read(snapshot, source_store, domain_filter) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                store = %source_store.display(),
                error = %e,
                "cookie store unreadable, yielding no cookies"
            );
            Vec::new()
        }
    }
}

fn try_read(
    snapshot: &Path,
    source_store: &Path,
    domain_filter: Option<&str>,
) -> Result<Vec<CookieRecord>, VaultError> {
    let conn = Connection::open_with_flags(snapshot, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    conn.busy_timeout(QUERY_TIMEOUT)?;
    // LIKE is case-insensitive for ASCII by default; the domain filter is an
    // exact substring match.
    conn.pragma_update(None, "case_sensitive_like", true)?;

    let mut records = Vec::new();
    match domain_filter {
        Some(domain) if !domain.is_empty() => {
            let mut stmt =
                conn.prepare("SELECT * FROM cookies WHERE host_key LIKE '%' || ?1 || '%'")?;
            let mut rows = stmt.query([domain])?;
            while let Some(row) = rows.next()? {
                push_record(row, source_store, &mut records);
            }
        }
        _ => {
            let mut stmt = conn.prepare("SELECT * FROM cookies")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                push_record(row, source_store, &mut records);
            }
        }
    }
    Ok(records)
}

fn push_record(row: &Row<'_>, source_store: &Path, records: &mut Vec<CookieRecord>) {
    match record_from_row(row, source_store) {
        Ok(Some(record)) => records.push(record),
        Ok(None) => {}
        Err(e) => {
            tracing::debug!(store = %source_store.display(), error = %e, "skipping malformed cookie row");
        }
    }
}

fn record_from_row(row: &Row<'_>, source_store: &Path) -> rusqlite::Result<Option<CookieRecord>> {
    let name: String = row.get("name")?;
    let encrypted_value: Vec<u8> = row.get("encrypted_value")?;
    let path: String = row.get("path")?;
    let domain: String = row.get("host_key")?;
    let secure = flag(row, "secure", "is_secure")?;
    let http_only = flag(row, "is_httponly", "httponly")?;
    let expires_utc: i64 = row.get("expires_utc")?;

    // Rows without ciphertext (plaintext-only cookies) or without identity
    // carry nothing for the decryption pipeline.
    if name.is_empty() || domain.is_empty() || encrypted_value.is_empty() {
        return Ok(None);
    }

    Ok(Some(CookieRecord {
        name,
        encrypted_value,
        expires: chromedb::chrome_time_to_offset(expires_utc),
        path,
        domain,
        secure,
        http_only,
        source_store: source_store.to_path_buf(),
    }))
}

/// Boolean flag stored under either of two column names depending on the
/// schema version. Surfaces whichever is present; if neither is, the row
/// error propagates and the row is skipped.
fn flag(row: &Row<'_>, primary: &str, alternate: &str) -> rusqlite::Result<bool> {
    match row.get::<_, i64>(primary) {
        Ok(v) => Ok(v != 0),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(row.get::<_, i64>(alternate)? != 0),
        Err(e) => Err(e),
    }
}
