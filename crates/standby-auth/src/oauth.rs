//! Interactive first-run consent flow.
//!
//! Opens the Google consent page in a browser and waits for the redirect
//! on a loopback callback server. Only the startup bootstrap runs this;
//! the refresh path never does.

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::client_secrets::ClientSecrets;
use crate::error::AuthError;
use crate::google::CALENDAR_READONLY_SCOPE;
use crate::storage::TokenSet;

/// Default wait for the browser redirect. The display only opens once
/// every account has been through consent, so this stays short.
pub const DEFAULT_CONSENT_WAIT: Duration = Duration::from_secs(120);

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<(String, String)>>>>;

/// One interactive authorization for one account.
pub struct ConsentFlow {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    wait_timeout: Duration,
}

impl ConsentFlow {
    pub fn new(secrets: ClientSecrets) -> Self {
        Self {
            secrets,
            scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
            wait_timeout: DEFAULT_CONSENT_WAIT,
        }
    }

    /// How long to wait for the browser redirect before giving up.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    fn client(&self, redirect_uri: String) -> Result<BasicClient, AuthError> {
        let auth_url = AuthUrl::new(self.secrets.auth_uri.clone())
            .map_err(|e| AuthError::InvalidCredentials(format!("auth_uri: {}", e)))?;
        let token_url = TokenUrl::new(self.secrets.token_uri.clone())
            .map_err(|e| AuthError::InvalidCredentials(format!("token_uri: {}", e)))?;
        let redirect_url = RedirectUrl::new(redirect_uri)
            .map_err(|e| AuthError::OAuthFailed(format!("redirect uri: {}", e)))?;

        Ok(BasicClient::new(
            ClientId::new(self.secrets.client_id.clone()),
            Some(ClientSecret::new(self.secrets.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    /// Build the consent URL. Returns the URL, the CSRF state and the PKCE
    /// verifier needed to redeem the code.
    pub fn authorization_url(
        &self,
        redirect_uri: String,
    ) -> Result<(String, CsrfToken, PkceCodeVerifier), AuthError> {
        let client = self.client(redirect_uri)?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        // offline access is what yields a refresh token
        let (url, csrf_token) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        Ok((url.to_string(), csrf_token, pkce_verifier))
    }

    /// Run the full flow for `account`: callback server, browser, code exchange.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run(&self, account: &str) -> Result<TokenSet, AuthError> {
        let (tx, rx) = oneshot::channel();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(|params: HashMap<String, String>, tx: CallbackSender| async move {
                let code = params.get("code").cloned().unwrap_or_default();
                let state = params.get("state").cloned().unwrap_or_default();

                if let Some(sender) = tx.lock().await.take() {
                    let _ = sender.send((code, state));
                }

                Ok::<_, warp::Rejection>(warp::reply::html(
                    "<html><body><h1>Authorization complete</h1><p>You can close this window.</p></body></html>",
                ))
            });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
                let _ = shutdown_rx.await;
            })
            .map_err(|e| AuthError::OAuthFailed(format!("callback server: {}", e)))?;
        let server = tokio::spawn(server);

        let redirect_uri = format!("http://{}/callback", addr);
        let (auth_url, csrf_token, pkce_verifier) = self.authorization_url(redirect_uri.clone())?;

        tracing::info!("Authorize calendar account '{}' in the browser", account);
        tracing::info!("If no browser opens, visit: {}", auth_url);
        tracing::info!("Waiting up to {}s for sign-in", self.wait_timeout.as_secs());
        if let Err(e) = webbrowser::open(&auth_url) {
            tracing::warn!("Failed to open browser: {}", e);
        }

        let received = tokio::time::timeout(self.wait_timeout, rx).await;
        let _ = shutdown_tx.send(());
        let _ = server.await;

        let (code, state) = match received {
            Ok(Ok(pair)) => pair,
            Ok(Err(_)) => {
                return Err(AuthError::OAuthFailed(
                    "callback server closed early".to_string(),
                ))
            }
            Err(_) => return Err(AuthError::CallbackTimeout),
        };

        if state != *csrf_token.secret() {
            return Err(AuthError::OAuthFailed("CSRF token mismatch".to_string()));
        }
        if code.is_empty() {
            return Err(AuthError::OAuthFailed("consent was denied".to_string()));
        }

        self.exchange_code(code, redirect_uri, pkce_verifier).await
    }

    async fn exchange_code(
        &self,
        code: String,
        redirect_uri: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<TokenSet, AuthError> {
        let token_result = self
            .client(redirect_uri)?
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::OAuthFailed(format!("code exchange: {}", e)))?;

        let expires_in = token_result
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(3600);

        let scopes = token_result
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_default();

        Ok(TokenSet {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
            scopes,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn flow() -> ConsentFlow {
        ConsentFlow::new(ClientSecrets {
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        })
    }

    #[test]
    fn test_auth_url_requests_offline_readonly_access() {
        let (url, _state, _verifier) = flow()
            .authorization_url("http://127.0.0.1:5555/callback".to_string())
            .unwrap();

        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("calendar.readonly"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A5555%2Fcallback"));
    }

    #[test]
    fn test_state_is_unique() {
        let (_, state1, _) = flow()
            .authorization_url("http://127.0.0.1:1/callback".to_string())
            .unwrap();
        let (_, state2, _) = flow()
            .authorization_url("http://127.0.0.1:1/callback".to_string())
            .unwrap();
        assert_ne!(state1.secret(), state2.secret());
    }

    #[test]
    fn test_wait_timeout_default_and_override() {
        assert_eq!(flow().wait_timeout, DEFAULT_CONSENT_WAIT);
        let flow = flow().with_wait_timeout(Duration::from_secs(30));
        assert_eq!(flow.wait_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_bad_auth_uri_is_invalid_credentials() {
        let flow = ConsentFlow::new(ClientSecrets {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: "not a url".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        });
        let result = flow.authorization_url("http://127.0.0.1:1/callback".to_string());
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }
}
