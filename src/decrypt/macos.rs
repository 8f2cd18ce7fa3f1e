//! macOS key material from the system keychain.
//!
//! The browser stores its master password as a generic keychain credential
//! ("Chrome Safe Storage"). The lookup may prompt the user or be denied;
//! either way it happens at most once per process, and a failure leaves
//! every cookie in its encrypted form rather than aborting the run.

use crate::chromedb::keyring;

/// Generic-password lookup coordinates for one browser.
pub struct KeychainSource {
    service: &'static str,
    account: &'static str,
}

impl KeychainSource {
    pub fn chrome() -> Self {
        KeychainSource {
            service: keyring::MACOS_CHROME_SERVICE,
            account: keyring::MACOS_CHROME_ACCOUNT,
        }
    }

    pub fn service(&self) -> &str {
        self.service
    }

    pub fn account(&self) -> &str {
        self.account
    }
}

#[cfg(target_os = "macos")]
impl crate::decrypt::KeySource for KeychainSource {
    fn resolve(
        &self,
    ) -> Result<crate::decrypt::MasterKeyMaterial, crate::error::VaultError> {
        use crate::error::VaultError;
        use security_framework::passwords::get_generic_password;

        let password = get_generic_password(self.service, self.account)
            .map_err(|_| VaultError::KeychainUnavailable)?;
        let password =
            String::from_utf8(password).map_err(|_| VaultError::KeychainUnavailable)?;
        Ok(crate::decrypt::MasterKeyMaterial::DarwinPassword(password))
    }
}
