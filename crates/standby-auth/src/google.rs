//! Google OAuth2 token refresh for Calendar access.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client_secrets::ClientSecrets;
use crate::error::AuthError;
use crate::storage::TokenSet;

/// Read-only calendar scope; the display never writes events.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl GoogleTokenResponse {
    /// Convert into a storable token set. Google omits the refresh token on
    /// refresh responses, so the previous one is carried over.
    pub fn into_token_set(self, previous_refresh_token: Option<String>) -> TokenSet {
        let expires_at = chrono::Utc::now().timestamp() + self.expires_in as i64;
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expires_at,
            scopes: self
                .scope
                .split(' ')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuth2Provider {
    secrets: ClientSecrets,
    client: reqwest::Client,
}

impl GoogleOAuth2Provider {
    pub fn new(secrets: ClientSecrets, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { secrets, client })
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!("{}: {}", status, error_text)));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("Failed to parse refresh response: {}", e)))
    }
}
