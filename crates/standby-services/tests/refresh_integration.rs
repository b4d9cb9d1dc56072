//! Integration tests for RefreshLoop against mock weather and calendar APIs.
//!
//! These tests wire the real OpenWeatherMap provider and Google Calendar
//! backend to one wiremock server and check what gets committed.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use standby_auth::{CalendarAccounts, TokenSet, TokenStore};
use standby_calendar::{AgendaFetcher, CalendarClient, EventSource, GoogleCalendarBackend};
use standby_core::{Language, WeatherConfig};
use standby_services::{state_channel, AgendaRetention, RefreshLoop, RetryConfig};
use standby_weather::WeatherProvider;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn weather_body() -> serde_json::Value {
    serde_json::json!({
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain" }],
        "main": { "temp": 17.6, "humidity": 82 },
        "name": "Chiyoda"
    })
}

fn events_body(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "kind": "calendar#events", "items": items })
}

/// Write a valid, unexpired token for each account into `dir`.
fn accounts_with_tokens(dir: &TempDir, accounts: &[&str]) -> CalendarAccounts {
    let stores = ["personal", "work"]
        .iter()
        .map(|name| TokenStore::new(*name, dir.path().join(format!("token_{}.json", name))))
        .collect::<Vec<_>>();

    for store in &stores {
        if accounts.contains(&store.account()) {
            store
                .store(&TokenSet {
                    access_token: format!("{}-token", store.account()),
                    refresh_token: Some("refresh".to_string()),
                    expires_at: chrono::Utc::now().timestamp() + 3600,
                    scopes: vec![],
                })
                .unwrap();
        }
    }

    CalendarAccounts::new(None, stores)
}

fn refresh_loop(
    server: &MockServer,
    accounts: CalendarAccounts,
) -> (
    RefreshLoop<WeatherProvider, AgendaFetcher<GoogleCalendarBackend>>,
    standby_services::StateReceiver,
) {
    let weather = WeatherProvider::new(
        &WeatherConfig {
            api_key: "test_key".to_string(),
            zip_code: "100-0001,JP".to_string(),
            base_url: server.uri(),
        },
        Language::En,
        TIMEOUT,
    )
    .unwrap();

    let client = CalendarClient::new(&server.uri(), TIMEOUT).unwrap();
    let agenda = AgendaFetcher::new(
        GoogleCalendarBackend::new(client, accounts),
        vec!["personal".to_string(), "work".to_string()],
        chrono_tz::Asia::Tokyo,
    );

    let (tx, rx) = state_channel();
    let refresh = RefreshLoop::new(
        weather,
        agenda,
        Duration::from_secs(300),
        AgendaRetention::KeepLast,
        tx,
    )
    .with_retry(RetryConfig::none());
    (refresh, rx)
}

async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer personal-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(serde_json::json!([
            {
                "id": "p1",
                "summary": "Dentist",
                "start": { "dateTime": "2024-05-10T16:30:00+09:00" },
                "end": { "dateTime": "2024-05-10T17:00:00+09:00" }
            },
            {
                "id": "p2",
                "summary": "Mum's birthday",
                "start": { "date": "2024-05-10" },
                "end": { "date": "2024-05-11" }
            }
        ]))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer work-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(serde_json::json!([
            {
                "id": "w1",
                "summary": "Standup",
                // 00:15 UTC is 09:15 in Tokyo
                "start": { "dateTime": "2024-05-10T00:15:00Z" },
                "end": { "dateTime": "2024-05-10T00:30:00Z" }
            },
            {
                "id": "w2",
                "status": "cancelled",
                "start": { "dateTime": "2024-05-10T02:00:00Z" }
            }
        ]))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_commits_weather_and_merged_agenda() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let dir = TempDir::new().unwrap();

    let (mut refresh, rx) = refresh_loop(&server, accounts_with_tokens(&dir, &["personal", "work"]));
    assert!(rx.borrow().weather.is_none());

    let committed = refresh.refresh_once().await;
    assert_eq!(*rx.borrow(), committed);

    let weather = committed.weather.as_ref().unwrap();
    assert_eq!(weather.temperature, 18);
    assert_eq!(weather.condition_text, "light rain");
    assert_eq!(weather.humidity_percent, 82);
    assert!(committed.last_refresh_at.is_some());

    let rows: Vec<_> = committed
        .agenda
        .iter()
        .map(|e| (e.display_time.label(), e.title.as_str(), e.source.clone()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("All day".to_string(), "Mum's birthday", EventSource::Personal),
            ("09:15".to_string(), "Standup", EventSource::Work),
            ("16:30".to_string(), "Dentist", EventSource::Personal),
        ]
    );
}

#[tokio::test]
async fn test_account_without_token_is_isolated() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let dir = TempDir::new().unwrap();

    // work never completed consent
    let (mut refresh, _rx) = refresh_loop(&server, accounts_with_tokens(&dir, &["personal"]));
    let committed = refresh.refresh_once().await;

    assert_eq!(committed.agenda.len(), 2);
    assert!(committed.agenda.iter().all(|e| e.source == EventSource::Personal));
    assert!(committed.weather.is_some());
}

#[tokio::test]
async fn test_outage_keeps_last_good_state() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let dir = TempDir::new().unwrap();

    let (mut refresh, rx) = refresh_loop(&server, accounts_with_tokens(&dir, &["personal", "work"]));
    let first = refresh.refresh_once().await;

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let second = refresh.refresh_once().await;
    assert_eq!(second.weather, first.weather);
    assert_eq!(second.agenda, first.agenda);
    assert!(second.last_refresh_at >= first.last_refresh_at);
    assert_eq!(rx.borrow().agenda.len(), 3);
}

#[tokio::test]
async fn test_empty_day_clears_agenda() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    let dir = TempDir::new().unwrap();

    let (mut refresh, _rx) = refresh_loop(&server, accounts_with_tokens(&dir, &["personal", "work"]));
    assert_eq!(refresh.refresh_once().await.agenda.len(), 3);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(serde_json::json!([]))))
        .mount(&server)
        .await;

    let next = refresh.refresh_once().await;
    assert!(next.agenda.is_empty());
    assert!(next.weather.is_some());
}
