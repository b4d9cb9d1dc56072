pub mod accounts;
pub mod client_secrets;
pub mod error;
pub mod google;
pub mod oauth;
pub mod storage;

pub use accounts::{bootstrap_accounts, CalendarAccounts};
pub use client_secrets::ClientSecrets;
pub use error::AuthError;
pub use google::{GoogleOAuth2Provider, GoogleTokenResponse, CALENDAR_READONLY_SCOPE};
pub use oauth::ConsentFlow;
pub use storage::{TokenSet, TokenStore};
