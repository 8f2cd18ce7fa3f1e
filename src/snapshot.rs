//! Private working copies of live cookie stores.
//!
//! A running browser keeps its cookie database open and may hold locks on
//! it. Reads always go through a copy in the system temp directory so the
//! engine neither contends with those locks nor takes any of its own on the
//! live file. Each store gets a unique snapshot path (process id plus a
//! hash of the store path), so distinct stores can be processed
//! concurrently.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

/// A temp-directory copy of one cookie store.
///
/// Cleanup is idempotent: [`Snapshot::cleanup`] may be called any number of
/// times, and `Drop` runs it once more as a backstop. Removing an
/// already-deleted snapshot is a no-op, not an error.
#[derive(Debug)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Copy `store` to its snapshot path, overwriting any stale copy.
    pub fn of(store: &Path) -> io::Result<Snapshot> {
        let path = snapshot_path(store);
        fs::copy(store, &path)?;
        Ok(Snapshot { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the working copy.
    pub fn cleanup(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "snapshot cleanup failed");
            }
        }
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn snapshot_path(store: &Path) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    store.hash(&mut hasher);
    std::env::temp_dir().join(format!(
        "cookievault-{}-{:016x}",
        std::process::id(),
        hasher.finish()
    ))
}
