//! Multi-account agenda fetch.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::future::Future;
use std::time::Duration;

use standby_auth::CalendarAccounts;
use standby_core::CalendarConfig;

use crate::agenda::CalendarAgenda;
use crate::client::CalendarClient;
use crate::day::day_window;
use crate::error::CalendarError;
use crate::types::{ApiEvent, CalendarEvent, EventSource};

/// Lists raw events for one named account.
pub trait CalendarBackend: Send + Sync {
    fn list_events(
        &self,
        account: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<ApiEvent>, CalendarError>> + Send;
}

/// Google Calendar backend: per-account token, shared HTTP client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarBackend {
    client: CalendarClient,
    accounts: CalendarAccounts,
}

impl GoogleCalendarBackend {
    pub fn new(client: CalendarClient, accounts: CalendarAccounts) -> Self {
        Self { client, accounts }
    }

    pub fn from_config(
        config: &CalendarConfig,
        accounts: CalendarAccounts,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let client = CalendarClient::new(&config.base_url, timeout)?;
        Ok(Self::new(client, accounts))
    }
}

impl CalendarBackend for GoogleCalendarBackend {
    async fn list_events(
        &self,
        account: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ApiEvent>, CalendarError> {
        let token = self.accounts.access_token(account).await?;
        self.client.list_all_events(&token, day_start, day_end).await
    }
}

/// Outcome of one agenda fetch across all accounts.
#[derive(Debug, Clone, Default)]
pub struct AgendaFetch {
    pub agenda: CalendarAgenda,
    pub succeeded_accounts: Vec<String>,
    pub failed_accounts: Vec<String>,
}

impl AgendaFetch {
    /// Every configured account failed, as opposed to an empty day.
    pub fn is_total_failure(&self) -> bool {
        !self.failed_accounts.is_empty() && self.succeeded_accounts.is_empty()
    }
}

/// Fetches today's events for each account and merges them.
pub struct AgendaFetcher<B> {
    backend: B,
    accounts: Vec<String>,
    tz: Tz,
}

impl<B: CalendarBackend> AgendaFetcher<B> {
    pub fn new(backend: B, accounts: Vec<String>, tz: Tz) -> Self {
        Self {
            backend,
            accounts,
            tz,
        }
    }

    /// Fetch the agenda for the local day containing `now`.
    ///
    /// Accounts are queried one after another; a failing account is logged
    /// and left out without affecting the others.
    pub async fn fetch(&self, now: DateTime<Utc>) -> AgendaFetch {
        let (day_start, day_end) = day_window(now, self.tz);
        let mut events = Vec::new();
        let mut result = AgendaFetch::default();

        for account in &self.accounts {
            match self.backend.list_events(account, day_start, day_end).await {
                Ok(items) => {
                    let source = EventSource::from_account(account);
                    let before = events.len();
                    events.extend(
                        items
                            .into_iter()
                            .filter_map(|api| CalendarEvent::from_api(api, source.clone(), self.tz)),
                    );
                    tracing::debug!(
                        "Fetched {} events for account {}",
                        events.len() - before,
                        account
                    );
                    result.succeeded_accounts.push(account.clone());
                }
                Err(e) if e.needs_consent() => {
                    tracing::warn!(
                        "Calendar account {} is not signed in; restart to authorize it: {}",
                        account,
                        e
                    );
                    result.failed_accounts.push(account.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        transient = e.is_retryable(),
                        "Calendar fetch failed for account {}: {}",
                        account,
                        e
                    );
                    result.failed_accounts.push(account.clone());
                }
            }
        }

        result.agenda = CalendarAgenda::new(events);
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::types::DisplayTime;
    use standby_auth::TokenSet;
    use standby_auth::TokenStore;
    use std::collections::HashMap;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Backend answering from a fixed table; missing accounts fail.
    struct FakeBackend {
        events: HashMap<String, Vec<ApiEvent>>,
    }

    impl FakeBackend {
        fn new(entries: &[(&str, serde_json::Value)]) -> Self {
            let events = entries
                .iter()
                .map(|(account, items)| {
                    (
                        account.to_string(),
                        serde_json::from_value(items.clone()).unwrap(),
                    )
                })
                .collect();
            Self { events }
        }
    }

    impl CalendarBackend for FakeBackend {
        async fn list_events(
            &self,
            account: &str,
            _day_start: DateTime<Utc>,
            _day_end: DateTime<Utc>,
        ) -> Result<Vec<ApiEvent>, CalendarError> {
            self.events
                .get(account)
                .cloned()
                .ok_or(CalendarError::TokenRejected)
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-02-01T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn accounts() -> Vec<String> {
        vec!["personal".to_string(), "work".to_string()]
    }

    #[tokio::test]
    async fn test_merges_and_sorts_accounts() {
        let backend = FakeBackend::new(&[
            (
                "personal",
                serde_json::json!([
                    {"id": "p1", "summary": "Dentist", "start": {"dateTime": "2024-02-02T06:00:00Z"}},
                    {"id": "p2", "summary": "Birthday", "start": {"date": "2024-02-02"}}
                ]),
            ),
            (
                "work",
                serde_json::json!([
                    {"id": "w1", "summary": "Standup", "start": {"dateTime": "2024-02-02T00:30:00Z"}},
                    {"id": "w2", "start": {"dateTime": "2024-02-02T06:00:00Z"}}
                ]),
            ),
        ]);

        let fetcher = AgendaFetcher::new(backend, accounts(), chrono_tz::Asia::Tokyo);
        let result = fetcher.fetch(now()).await;

        assert!(result.failed_accounts.is_empty());
        let rows: Vec<_> = result
            .agenda
            .iter()
            .map(|e| (e.display_time.label(), e.title.as_str(), e.source.account()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("All day".to_string(), "Birthday", "personal"),
                ("09:30".to_string(), "Standup", "work"),
                ("15:00".to_string(), "Dentist", "personal"),
                ("15:00".to_string(), "(No title)", "work"),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_account() {
        let backend = FakeBackend::new(&[(
            "work",
            serde_json::json!([
                {"id": "w1", "summary": "Review", "start": {"dateTime": "2024-02-02T05:00:00Z"}}
            ]),
        )]);

        let fetcher = AgendaFetcher::new(backend, accounts(), chrono_tz::Asia::Tokyo);
        let result = fetcher.fetch(now()).await;

        assert_eq!(result.failed_accounts, vec!["personal".to_string()]);
        assert_eq!(result.succeeded_accounts, vec!["work".to_string()]);
        assert!(!result.is_total_failure());
        assert_eq!(result.agenda.len(), 1);
        assert!(result.agenda.events()[0].source.is_work());
    }

    #[tokio::test]
    async fn test_total_failure_distinct_from_empty_day() {
        let failing = AgendaFetcher::new(FakeBackend::new(&[]), accounts(), chrono_tz::UTC);
        let result = failing.fetch(now()).await;
        assert!(result.is_total_failure());
        assert!(result.agenda.is_empty());

        let empty = AgendaFetcher::new(
            FakeBackend::new(&[
                ("personal", serde_json::json!([])),
                ("work", serde_json::json!([])),
            ]),
            accounts(),
            chrono_tz::UTC,
        );
        let result = empty.fetch(now()).await;
        assert!(!result.is_total_failure());
        assert!(result.agenda.is_empty());
    }

    #[tokio::test]
    async fn test_google_backend_uses_account_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("Authorization", "Bearer personal-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "a", "summary": "Yoga", "start": {"date": "2024-02-02"}}]
            })))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let personal = TokenStore::new("personal", dir.path().join("token_personal.json"));
        personal
            .store(&TokenSet {
                access_token: "personal-token".to_string(),
                refresh_token: None,
                expires_at: chrono::Utc::now().timestamp() + 3600,
                scopes: vec![],
            })
            .unwrap();
        let work = TokenStore::new("work", dir.path().join("token_work.json"));

        let client = CalendarClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let backend =
            GoogleCalendarBackend::new(client, CalendarAccounts::new(None, vec![personal, work]));
        let fetcher = AgendaFetcher::new(backend, accounts(), chrono_tz::Asia::Tokyo);

        let result = fetcher.fetch(now()).await;
        assert_eq!(result.failed_accounts, vec!["work".to_string()]);
        assert_eq!(result.agenda.len(), 1);
        assert_eq!(result.agenda.events()[0].display_time, DisplayTime::AllDay);
    }
}
