use standby_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

/// Authentication errors (client secrets, stored tokens, OAuth flows).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No stored token for account: {0}")]
    TokenNotFound(String),

    #[error("Account {0} needs interactive consent")]
    ConsentRequired(String),

    #[error("Invalid client credentials: {0}")]
    InvalidCredentials(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("Timed out waiting for the OAuth callback")]
    CallbackTimeout,

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.into_network_error())
    }
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::TokenNotFound(_) | AuthError::ConsentRequired(_) => {
                "Calendar account is not signed in."
            }
            AuthError::InvalidCredentials(_) => "Calendar client credentials are invalid.",
            AuthError::RefreshFailed(_) => "Calendar sign-in expired.",
            AuthError::OAuthFailed(_) | AuthError::CallbackTimeout => "Calendar sign-in failed.",
            AuthError::Storage(_) => "Failed to read or save calendar credentials.",
            AuthError::Network(e) => e.user_message(),
        }
    }

    /// Whether the account cannot recover without a person at the browser.
    pub fn needs_consent(&self) -> bool {
        matches!(
            self,
            AuthError::TokenNotFound(_) | AuthError::ConsentRequired(_)
        )
    }
}
