//! Per-account access tokens for the calendar fetcher.

use std::time::Duration;

use standby_core::CalendarConfig;

use crate::client_secrets::ClientSecrets;
use crate::error::AuthError;
use crate::google::GoogleOAuth2Provider;
use crate::oauth::ConsentFlow;
use crate::storage::TokenStore;

/// Token handles for every configured calendar account.
///
/// Refreshing here is always non-interactive. An account whose token is
/// missing or unrefreshable reports [`AuthError::ConsentRequired`].
#[derive(Debug, Clone)]
pub struct CalendarAccounts {
    provider: Option<GoogleOAuth2Provider>,
    stores: Vec<TokenStore>,
}

impl CalendarAccounts {
    pub fn new(provider: Option<GoogleOAuth2Provider>, stores: Vec<TokenStore>) -> Self {
        Self { provider, stores }
    }

    /// Build handles from configuration without touching the network.
    pub fn from_config(config: &CalendarConfig, timeout: Duration) -> Self {
        let provider = match ClientSecrets::from_file(&config.credentials_file) {
            Ok(secrets) => match GoogleOAuth2Provider::new(secrets, timeout) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!("Failed to build OAuth client: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Calendar credentials unavailable: {}", e);
                None
            }
        };

        let stores = config
            .accounts
            .iter()
            .map(|account| TokenStore::new(account.clone(), config.token_path(account)))
            .collect();

        Self::new(provider, stores)
    }

    /// Configured account names, in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.iter().map(|s| s.account())
    }

    fn store(&self, account: &str) -> Result<&TokenStore, AuthError> {
        self.stores
            .iter()
            .find(|s| s.account() == account)
            .ok_or_else(|| AuthError::TokenNotFound(account.to_string()))
    }

    /// A usable access token for `account`, refreshing and persisting it
    /// first when it is close to expiry.
    pub async fn access_token(&self, account: &str) -> Result<String, AuthError> {
        let store = self.store(account)?;
        let token_set = store
            .load()?
            .ok_or_else(|| AuthError::ConsentRequired(account.to_string()))?;

        if !token_set.needs_refresh() {
            return Ok(token_set.access_token);
        }

        let refresh_token = token_set
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::ConsentRequired(account.to_string()))?;

        let provider = self.provider.as_ref().ok_or_else(|| {
            AuthError::InvalidCredentials("no client secrets loaded".to_string())
        })?;

        tracing::debug!("Refreshing access token for account: {}", account);
        let refreshed = provider
            .refresh_token(&refresh_token)
            .await?
            .into_token_set(Some(refresh_token));

        store.store(&refreshed)?;
        Ok(refreshed.access_token)
    }
}

/// Make sure every configured account has a stored token, running the
/// interactive consent flow for those that do not.
///
/// Failures are logged and skipped; an account left without a token
/// simply fails its fetches until the next start.
pub async fn bootstrap_accounts(config: &CalendarConfig, timeout: Duration) -> CalendarAccounts {
    let accounts = CalendarAccounts::from_config(config, timeout);

    let secrets = accounts.provider.as_ref().map(|p| p.secrets().clone());

    for store in &accounts.stores {
        match store.load() {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring unreadable token for {}: {}", store.account(), e);
            }
        }

        let Some(secrets) = secrets.clone() else {
            tracing::warn!(
                "Skipping sign-in for {}: {} not found",
                store.account(),
                config.credentials_file.display()
            );
            continue;
        };

        let flow = ConsentFlow::new(secrets).with_wait_timeout(config.consent_timeout());
        match flow.run(store.account()).await {
            Ok(token_set) => {
                if let Err(e) = store.store(&token_set) {
                    tracing::error!("Failed to save token for {}: {}", store.account(), e);
                }
            }
            Err(e) => {
                tracing::error!(
                    "{} Account {}: {}",
                    e.user_message(),
                    store.account(),
                    e
                );
            }
        }
    }

    accounts
}
