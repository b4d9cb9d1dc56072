//! Calendar-specific error types.

use standby_auth::AuthError;
use standby_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// The API rejected the bearer token (401).
    #[error("Access token rejected")]
    TokenRejected,

    /// The token lacks calendar access (403).
    #[error("Calendar access denied")]
    AccessDenied,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<reqwest::Error> for CalendarError {
    fn from(e: reqwest::Error) -> Self {
        CalendarError::Network(e.into_network_error())
    }
}

impl CalendarError {
    /// Whether only an interactive sign-in can fix this account.
    pub fn needs_consent(&self) -> bool {
        match self {
            Self::Auth(e) => e.needs_consent(),
            Self::AccessDenied => true,
            _ => false,
        }
    }

    /// Whether the next refresh cycle has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::TokenRejected => true,
            Self::Network(e) => e.is_transient(),
            Self::Auth(AuthError::Network(e)) => e.is_transient(),
            _ => false,
        }
    }
}
