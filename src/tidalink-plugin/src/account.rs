use crate::protocol::{AccountView, PluginError, PluginErrorKind};
use std::sync::{Mutex, PoisonError};
use tidalink_core::catalog::Credentials;
use tidalink_core::config::{AccountConfig, Config, ConfigError};
use tidalink_core::paths::AppDirs;
use tidalink_core::secrets::{CredentialStore, SecretsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secrets(#[from] SecretsError),
}

impl From<AccountError> for PluginError {
    fn from(err: AccountError) -> Self {
        PluginError::new(PluginErrorKind::Internal, err.to_string())
    }
}

/// Where the four account fields are persisted between plugin runs.
pub trait AccountStore: Send + Sync {
    fn load(&self) -> Result<Credentials, AccountError>;

    fn save(&self, credentials: &Credentials) -> Result<(), AccountError>;

    /// Drop the saved password; the rest of the account stays for the form.
    fn forget_password(&self) -> Result<(), AccountError>;

    fn view(&self) -> Result<AccountView, AccountError> {
        let saved = self.load()?;
        Ok(AccountView {
            has_password: !saved.password.is_empty(),
            has_token: !saved.token.is_empty(),
            username: saved.username,
            quality: saved.quality,
        })
    }
}

/// Account fields in `config.toml`, password in the OS keyring.
pub struct SavedAccount {
    dirs: AppDirs,
    config: Mutex<Config>,
    secrets: CredentialStore,
}

impl SavedAccount {
    pub fn new(dirs: AppDirs, config: Config, secrets: CredentialStore) -> Self {
        Self {
            dirs,
            config: Mutex::new(config),
            secrets,
        }
    }

    fn account(&self) -> AccountConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .account
            .clone()
    }
}

impl AccountStore for SavedAccount {
    fn load(&self) -> Result<Credentials, AccountError> {
        let account = self.account();
        let password = if account.username.is_empty() {
            None
        } else {
            self.secrets.password(&account.username)?
        };
        Ok(Credentials::new(
            account.username,
            password.unwrap_or_default(),
            account.token,
            account.quality,
        ))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AccountError> {
        {
            let mut config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
            config.account = AccountConfig {
                username: credentials.username.clone(),
                token: credentials.token.clone(),
                quality: credentials.quality.clone(),
            };
            config.save(&self.dirs)?;
        }
        if !credentials.username.is_empty() && !credentials.password.is_empty() {
            self.secrets
                .store_password(&credentials.username, &credentials.password)?;
        }
        Ok(())
    }

    fn forget_password(&self) -> Result<(), AccountError> {
        let account = self.account();
        if account.username.is_empty() {
            return Ok(());
        }
        self.secrets.clear_account(&account.username)?;
        Ok(())
    }
}
