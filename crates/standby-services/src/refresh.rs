//! Background refresh loop.
//!
//! Polls the scheduler about once a second and, when a refresh is due,
//! fetches weather and then the agenda, builds the next [`RefreshState`]
//! and publishes it in a single swap.
//!
//! Each fetch runs in its own task. A source that panics is logged and
//! treated as a failed fetch; the loop carries on with the next cycle.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use standby_calendar::AgendaFetch;
use standby_weather::{WeatherError, WeatherSnapshot};

use crate::retry::{with_retry, RetryConfig};
use crate::scheduler::RefreshScheduler;
use crate::sources::{AgendaSource, WeatherSource};
use crate::state::{AgendaRetention, RefreshState, StateSender};

const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub struct RefreshLoop<W, A> {
    weather: Arc<W>,
    agenda: Arc<A>,
    scheduler: RefreshScheduler,
    retention: AgendaRetention,
    retry: RetryConfig,
    tick: Duration,
    tx: StateSender,
}

impl<W, A> RefreshLoop<W, A>
where
    W: WeatherSource + 'static,
    A: AgendaSource + 'static,
{
    pub fn new(
        weather: W,
        agenda: A,
        interval: Duration,
        retention: AgendaRetention,
        tx: StateSender,
    ) -> Self {
        Self {
            weather: Arc::new(weather),
            agenda: Arc::new(agenda),
            scheduler: RefreshScheduler::new(interval),
            retention,
            retry: RetryConfig::default(),
            tick: DEFAULT_TICK,
            tx,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    async fn fetch_weather(&self) -> Option<WeatherSnapshot> {
        let source = Arc::clone(&self.weather);
        let retry = self.retry.clone();
        let fetched = tokio::spawn(async move {
            let attempt = move || {
                let source = Arc::clone(&source);
                async move { source.fetch_weather().await }
            };
            with_retry(&retry, attempt, WeatherError::is_retryable).await
        })
        .await;

        match fetched {
            Ok(Ok(snapshot)) => {
                tracing::debug!(
                    "Weather: {} {}°C {}%",
                    snapshot.condition_text,
                    snapshot.temperature,
                    snapshot.humidity_percent
                );
                Some(snapshot)
            }
            Ok(Err(e)) => {
                tracing::warn!("Weather fetch failed, keeping previous snapshot: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("Weather fetch task failed, keeping previous snapshot: {}", e);
                None
            }
        }
    }

    async fn fetch_agenda(&self, previous: &RefreshState) -> AgendaFetch {
        let source = Arc::clone(&self.agenda);
        let now = Utc::now();
        match tokio::spawn(async move { source.fetch_agenda(now).await }).await {
            Ok(agenda) => agenda,
            Err(e) => {
                tracing::error!("Agenda fetch task failed, keeping previous agenda: {}", e);
                // nothing was fetched; carry the current agenda over
                AgendaFetch {
                    agenda: previous.agenda.clone(),
                    ..AgendaFetch::default()
                }
            }
        }
    }

    /// Run one refresh cycle and publish the result.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn refresh_once(&mut self) -> Arc<RefreshState> {
        let weather = self.fetch_weather().await;

        let previous = self.tx.borrow().clone();
        let agenda = self.fetch_agenda(&previous).await;
        if agenda.is_total_failure() {
            tracing::warn!(
                "All calendar accounts failed: {}",
                agenda.failed_accounts.join(", ")
            );
        }

        let next = Arc::new(previous.next(weather, agenda, self.retention, Utc::now()));
        self.tx.send_replace(next.clone());

        tracing::info!(
            "Refresh committed: weather {}, {} events",
            if next.weather.is_some() { "present" } else { "absent" },
            next.agenda.len()
        );
        next
    }

    /// Drive the scheduler until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(
            "Refresh loop started, interval {:?}",
            self.scheduler.interval()
        );

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if !self.scheduler.poll(Instant::now()) {
                continue;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.refresh_once() => {}
            }
            self.scheduler.complete(Instant::now());
        }

        tracing::info!("Refresh loop stopped");
    }
}
