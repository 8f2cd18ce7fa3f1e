//! Chromium cookie database constants and conversions.
//!
//! Everything here mirrors Chromium's on-disk cookie storage so that the
//! rest of the crate can stay free of magic numbers.
//!
//! ## Reference Files
//! - `net/extras/sqlite/sqlite_persistent_cookie_store.cc`
//! - `components/os_crypt/sync/os_crypt_posix.cc`
//! - `components/os_crypt/sync/os_crypt_win.cc`

use time::OffsetDateTime;

/// Canonical file name of a Chromium cookie store.
///
/// Profile directories contain files whose names *end* with this suffix
/// (e.g. `Cookies`, `Safe Browsing Cookies`), so discovery matches on the
/// suffix rather than the exact name.
pub const STORE_FILENAME: &str = "Cookies";

/// Chromium stores timestamps as microseconds since 1601-01-01 00:00:00 UTC
/// (the Windows FILETIME epoch). Offset from the Unix epoch in microseconds.
///
/// Reference: `base/time/time.h`
pub const CHROME_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Convert a Chrome-epoch expiry to an [`OffsetDateTime`].
///
/// A stored value of `0` means a session cookie and maps to `None`.
pub fn chrome_time_to_offset(chrome_time: i64) -> Option<OffsetDateTime> {
    if chrome_time == 0 {
        return None;
    }
    let unix_micros = chrome_time - CHROME_EPOCH_OFFSET_MICROS;
    OffsetDateTime::from_unix_timestamp_nanos(unix_micros as i128 * 1000).ok()
}

/// Convert an [`OffsetDateTime`] back to Chrome-epoch microseconds.
pub fn offset_to_chrome_time(time: OffsetDateTime) -> i64 {
    let unix_secs = time.unix_timestamp();
    (unix_secs * 1_000_000) + CHROME_EPOCH_OFFSET_MICROS
}

/// Encryption parameters shared by every Chromium platform build.
///
/// Reference: `components/os_crypt/sync/os_crypt_posix.cc`
pub mod encryption {
    /// Version marker prefixed to AES-encrypted cookie values.
    pub const V10_PREFIX: &[u8] = b"v10";

    /// Well-known password used by the POSIX build when no keyring backs
    /// the profile. Shared across every install on that platform.
    pub const V10_PASSWORD: &str = "peanuts";

    /// Salt used for all PBKDF2 key derivation.
    pub const CHROME_SALT: &[u8] = b"saltysalt";

    /// PBKDF2 iterations on Linux.
    pub const LINUX_ITERATIONS: u32 = 1;

    /// PBKDF2 iterations on macOS.
    pub const MACOS_ITERATIONS: u32 = 1003;

    /// Derived AES-128 key length for the CBC scheme.
    pub const DERIVED_KEY_LEN: usize = 16;

    /// AES-CBC IV: 16 ASCII space characters. A known weakness of the
    /// legacy scheme, reproduced exactly; changing it breaks compatibility
    /// with browser-produced ciphertext.
    pub const AES_CBC_IV: [u8; 16] = [0x20; 16];

    /// Marker prefixed to the DPAPI-wrapped master key in `Local State`.
    pub const DPAPI_KEY_PREFIX: &[u8] = b"DPAPI";

    /// Unwrapped Windows master key length (AES-256).
    pub const MASTER_KEY_LEN: usize = 32;

    /// GCM nonce length embedded in Windows ciphertext.
    pub const GCM_NONCE_LEN: usize = 12;

    /// GCM authentication tag length trailing Windows ciphertext.
    pub const GCM_TAG_LEN: usize = 16;
}

/// Profile roots searched for cookie stores, relative to the user's home
/// directory. Roots that do not exist on the current host are skipped.
pub mod paths {
    /// Windows, current layout (`%LOCALAPPDATA%` equivalent).
    pub const WINDOWS_CHROME: &str = "AppData/Local/Google/Chrome/User Data";

    /// Windows, pre-Vista layout still found on migrated profiles.
    pub const WINDOWS_CHROME_LEGACY: &str = "Application Data/Google/Chrome/User Data";

    /// macOS application-support layout.
    pub const MACOS_CHROME: &str = "Library/Application Support/Google/Chrome";

    /// Linux stable Chrome.
    pub const LINUX_CHROME: &str = ".config/google-chrome";

    /// Linux Chromium fork.
    pub const LINUX_CHROMIUM: &str = ".config/chromium";

    /// Every root worth walking, in search order.
    pub const PROFILE_ROOTS: &[&str] = &[
        WINDOWS_CHROME,
        WINDOWS_CHROME_LEGACY,
        MACOS_CHROME,
        LINUX_CHROME,
        LINUX_CHROMIUM,
    ];

    /// Per-browser key configuration file, relative to home (Windows only).
    pub const WINDOWS_LOCAL_STATE: &str = "AppData/Local/Google/Chrome/User Data/Local State";
}

/// Keychain coordinates of the master password on macOS.
///
/// Reference: `components/os_crypt/sync/keychain_password_mac.mm`
pub mod keyring {
    pub const MACOS_CHROME_SERVICE: &str = "Chrome Safe Storage";
    pub const MACOS_CHROME_ACCOUNT: &str = "Chrome";
}
