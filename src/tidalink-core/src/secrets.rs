//! Account secrets in the OS keyring.
//!
//! Entries live under the keyring service `tidalink` with user keys of the
//! form `<service>/<username>/<kind>`, e.g. `tidal/listener/password`.

use thiserror::Error;

const KEYRING_SERVICE: &str = "tidalink";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Account password used for the username login.
    Password,
    /// API token sent alongside the login.
    ApiToken,
}

impl SecretKind {
    fn as_str(&self) -> &'static str {
        match self {
            SecretKind::Password => "password",
            SecretKind::ApiToken => "api_token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    keyring_service: String,
    service: String,
}

impl CredentialStore {
    /// Store scoped to one catalog service (e.g. `tidal`).
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            keyring_service: KEYRING_SERVICE.into(),
            service: service.into(),
        }
    }

    fn key(&self, username: &str, kind: SecretKind) -> String {
        format!("{}/{}/{}", self.service, username, kind.as_str())
    }

    fn entry(&self, key: &str) -> SecretsResult<keyring::Entry> {
        Ok(keyring::Entry::new(&self.keyring_service, key)?)
    }

    pub fn store(&self, username: &str, kind: SecretKind, secret: &str) -> SecretsResult<()> {
        let key = self.key(username, kind);
        self.entry(&key)?.set_password(secret)?;
        tracing::debug!(service = %self.service, kind = ?kind, "stored credential in keyring");
        Ok(())
    }

    pub fn get(&self, username: &str, kind: SecretKind) -> SecretsResult<String> {
        let key = self.key(username, kind);
        match self.entry(&key)?.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Succeeds when the entry is already gone.
    pub fn delete(&self, username: &str, kind: SecretKind) -> SecretsResult<()> {
        let key = self.key(username, kind);
        match self.entry(&key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_password(&self, username: &str, password: &str) -> SecretsResult<()> {
        self.store(username, SecretKind::Password, password)
    }

    /// The saved password, or `None` when nothing was saved for `username`.
    pub fn password(&self, username: &str) -> SecretsResult<Option<String>> {
        match self.get(username, SecretKind::Password) {
            Ok(password) => Ok(Some(password)),
            Err(SecretsError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn clear_account(&self, username: &str) -> SecretsResult<()> {
        self.delete(username, SecretKind::Password)?;
        self.delete(username, SecretKind::ApiToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keyring round-trips need a platform credential store, so only the key
    // layout is covered here.

    #[test]
    fn keys_are_scoped_by_service_and_user() {
        let store = CredentialStore::new("tidal");
        assert_eq!(
            store.key("listener", SecretKind::Password),
            "tidal/listener/password"
        );
        assert_eq!(
            store.key("listener", SecretKind::ApiToken),
            "tidal/listener/api_token"
        );
    }
}
