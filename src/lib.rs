//! # cookievault
//!
//! Extraction and decryption of cookies from Chromium-family browser
//! profile stores, for forensic and session-automation tooling that needs
//! programmatic access to a user's own authenticated session state.
//!
//! ## How it works
//!
//! - **Discovery**: every known profile root under the user's home is
//!   walked recursively for cookie store files, user-created profiles
//!   included.
//! - **Snapshot**: each store is copied to a private temp path before it
//!   is opened, so reads never contend with a running browser's locks.
//! - **Row reading**: the snapshot is scanned read-only through SQLite,
//!   tolerating both known column-name variants of the secure/http-only
//!   flags.
//! - **Decryption**: the OS-specific master secret is resolved once per
//!   process (DPAPI-unwrapped key on Windows, keychain password on macOS,
//!   fixed well-known password on Linux) and drives the matching cipher
//!   pipeline (AES-256-GCM or PBKDF2 + AES-128-CBC).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookievault::ChromeVault;
//!
//! let vault = ChromeVault::new()?;
//! for cookie in vault.read_cookies(Some("example.com")) {
//!     println!("{cookie}");
//! }
//! # Ok::<(), cookievault::VaultError>(())
//! ```
//!
//! ## Failure policy
//!
//! Only construction can fail hard (a Windows host whose key configuration
//! cannot be read). An unreadable store yields zero cookies, a malformed
//! row is skipped, and a cookie that will not decrypt is returned in its
//! [`Cookie::Encrypted`] form with the original ciphertext intact.
//!
//! ## Chromium References
//!
//! - Database schema: `net/extras/sqlite/sqlite_persistent_cookie_store.cc`
//! - POSIX encryption: `components/os_crypt/sync/os_crypt_posix.cc`
//! - Windows encryption: `components/os_crypt/sync/os_crypt_win.cc`

pub mod chromedb;
pub mod cookie;
pub mod decrypt;
pub mod error;
pub mod locator;
pub mod rowreader;
pub mod snapshot;
pub mod vault;

pub use cookie::{Cookie, CookieRecord};
pub use decrypt::{DecryptError, Decryptor, KeySource, MasterKeyMaterial};
pub use error::VaultError;
pub use vault::ChromeVault;
