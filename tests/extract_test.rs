use std::fs;
use std::path::{Path, PathBuf};

use boring::symm::{encrypt, Cipher};
use rusqlite::Connection;
use tempfile::tempdir;

use cookievault::chromedb::{encryption, offset_to_chrome_time, paths};
use cookievault::decrypt::derive_key;
use cookievault::{ChromeVault, Decryptor, MasterKeyMaterial};

fn seal_linux_value(plaintext: &[u8]) -> Vec<u8> {
    let key = derive_key(encryption::V10_PASSWORD.as_bytes(), encryption::LINUX_ITERATIONS);
    let mut sealed = encryption::V10_PREFIX.to_vec();
    sealed.extend_from_slice(
        &encrypt(Cipher::aes_128_cbc(), &key, Some(&encryption::AES_CBC_IV), plaintext).unwrap(),
    );
    sealed
}

fn write_store(profile: &Path, rows: &[(&str, Vec<u8>, &str, i64)]) -> PathBuf {
    fs::create_dir_all(profile).unwrap();
    let db = profile.join("Cookies");
    let conn = Connection::open(&db).unwrap();
    conn.execute(
        "CREATE TABLE cookies (name TEXT, encrypted_value BLOB, path TEXT,
         host_key TEXT, expires_utc INTEGER, is_secure INTEGER, is_httponly INTEGER)",
        [],
    )
    .unwrap();
    for (name, value, host, expires) in rows {
        conn.execute(
            "INSERT INTO cookies VALUES (?1, ?2, '/', ?3, ?4, 1, 0)",
            rusqlite::params![name, value, host, expires],
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
fn extracts_and_decrypts_filtered_cookie() {
    let home = tempdir().unwrap();
    let profile = home.path().join(paths::LINUX_CHROMIUM).join("Default");
    write_store(&profile, &[("sid", seal_linux_value(b"abc123"), "example.com", 0)]);

    let vault = linux_vault(home.path());
    let cookies = vault.read_cookies(Some("example.com"));

    assert_eq!(cookies.len(), 1);
    let cookie = &cookies[0];
    assert!(cookie.is_decrypted());
    assert_eq!(cookie.name(), "sid");
    assert_eq!(cookie.domain(), "example.com");
    assert_eq!(cookie.value(), Some("abc123"));
    // The original ciphertext is retained for audit.
    assert!(cookie.record().encrypted_value.starts_with(b"v10"));
}

#[test]
fn non_matching_filter_yields_nothing() {
    let home = tempdir().unwrap();
    let profile = home.path().join(paths::LINUX_CHROMIUM).join("Default");
    write_store(&profile, &[("sid", seal_linux_value(b"abc123"), "example.com", 0)]);

    let vault = linux_vault(home.path());
    assert!(vault.read_cookies(Some("nomatch.com")).is_empty());
}

#[test]
fn cookies_from_every_profile_are_collected() {
    let home = tempdir().unwrap();
    let root = home.path().join(paths::LINUX_CHROMIUM);
    write_store(&root.join("Default"), &[("a", seal_linux_value(b"1"), "one.example", 0)]);
    write_store(&root.join("Profile 1"), &[("b", seal_linux_value(b"2"), "two.example", 0)]);

    let vault = linux_vault(home.path());
    assert_eq!(vault.list_cookie_stores().len(), 2);

    let mut names: Vec<_> = vault.read_cookies(None).iter().map(|c| c.name().to_string()).collect();
    names.sort();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn snapshots_are_cleaned_up_after_a_run() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let home = tempdir().unwrap();
    let profile = home.path().join(paths::LINUX_CHROMIUM).join("Default");
    let store = write_store(&profile, &[("sid", seal_linux_value(b"abc123"), "example.com", 0)]);

    let vault = linux_vault(home.path());
    assert_eq!(vault.read_cookies(None).len(), 1);

    // Snapshot paths are pid + store-path hash; the working copy for this
    // store must be gone once the run is over.
    let mut hasher = DefaultHasher::new();
    store.hash(&mut hasher);
    let snapshot = std::env::temp_dir().join(format!(
        "cookievault-{}-{:016x}",
        std::process::id(),
        hasher.finish()
    ));
    assert!(!snapshot.exists(), "snapshot file left behind: {}", snapshot.display());
}

#[test]
fn expiry_is_converted_from_chrome_epoch() {
    let home = tempdir().unwrap();
    let profile = home.path().join(paths::LINUX_CHROME).join("Default");
    let expires =
        offset_to_chrome_time(time::OffsetDateTime::from_unix_timestamp(1_893_456_000).unwrap());
    write_store(&profile, &[("sid", seal_linux_value(b"abc123"), "example.com", expires)]);

    let vault = linux_vault(home.path());
    let cookies = vault.read_cookies(None);
    assert_eq!(cookies.len(), 1);
    let record = cookies[0].record();
    assert_eq!(record.expires.unwrap().unix_timestamp(), 1_893_456_000);
    assert!(record.secure);
    assert!(!record.http_only);
}

#[test]
fn wrong_key_material_keeps_cookies_encrypted() {
    let home = tempdir().unwrap();
    let profile = home.path().join(paths::LINUX_CHROMIUM).join("Default");
    write_store(&profile, &[("sid", seal_linux_value(b"abc123"), "example.com", 0)]);

    let vault = ChromeVault::with_parts(
        home.path().to_path_buf(),
        Decryptor::with_material(MasterKeyMaterial::LinuxPassword("walnuts".to_string())),
    );
    let cookies = vault.read_cookies(None);
    assert_eq!(cookies.len(), 1);
    assert!(!cookies[0].is_decrypted());
    assert_eq!(cookies[0].value(), None);
}
