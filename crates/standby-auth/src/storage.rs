use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::AuthError;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(chrono::Utc::now().timestamp())
    }

    fn needs_refresh_at(&self, now: i64) -> bool {
        now >= self.expires_at - 300 // 5 minute buffer
    }
}

/// File-backed token storage for one calendar account.
///
/// The file content is opaque to the rest of the program; only this
/// module reads or writes it.
#[derive(Debug, Clone)]
pub struct TokenStore {
    account: String,
    path: PathBuf,
}

impl TokenStore {
    pub fn new(account: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            account: account.into(),
            path: path.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Load the stored token, `Ok(None)` if the account has never signed in.
    pub fn load(&self) -> Result<Option<TokenSet>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;

        let token_set: TokenSet = serde_json::from_str(&json)
            .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!("Loaded token for account: {}", self.account);
        Ok(Some(token_set))
    }

    /// Persist a token set, replacing any previous one.
    pub fn store(&self, token_set: &TokenSet) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(token_set)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        // write-then-rename
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| AuthError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| AuthError::Storage(e.to_string()))?;

        tracing::info!(
            "Stored token for account: {} at {}",
            self.account,
            self.path.display()
        );
        Ok(())
    }
}
