//! Cookie store discovery.
//!
//! Walks the known profile roots under a home directory and collects every
//! file whose name ends with the canonical `Cookies` suffix. Users create
//! extra profile subdirectories ("Profile 1", work profiles, forks), so the
//! walk is recursive rather than a fixed `Default/Cookies` lookup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::chromedb::{paths, STORE_FILENAME};

/// Find every cookie store under `home`, deduplicated and sorted.
///
/// Missing profile roots are skipped silently; an unreadable directory ends
/// that subtree's walk but never fails the enumeration. A home directory
/// with no browser profiles yields an empty list.
pub fn locate_cookie_stores(home: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in paths::PROFILE_ROOTS {
        let base = home.join(root);
        if base.is_dir() {
            collect_stores(&base, &mut found);
        }
    }
    found.sort();
    found.dedup();
    found
}

fn collect_stores(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "profile directory unreadable");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_stores(&path, out);
        } else if is_cookie_store(&path) {
            out.push(path);
        }
    }
}

fn is_cookie_store(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(STORE_FILENAME))
        .unwrap_or(false)
}
