use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "enrollkit";

/// Remembered sign-in passwords, kept in the OS keychain under the email.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for an email in the OS keychain
    pub fn store(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the password for an email, if one was remembered
    pub fn get_password(email: &str) -> Option<String> {
        Entry::new(SERVICE_NAME, email)
            .ok()
            .and_then(|entry| entry.get_password().ok())
    }

    /// Delete the remembered password for an email
    pub fn delete(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }
}
