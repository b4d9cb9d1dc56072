use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use standby_calendar::{AgendaFetch, CalendarAgenda};
use standby_weather::WeatherSnapshot;

/// What the display shows, as committed by the last refresh.
///
/// Never mutated in place; each refresh publishes a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshState {
    pub last_refresh_at: Option<DateTime<Utc>>,
    pub weather: Option<WeatherSnapshot>,
    pub agenda: CalendarAgenda,
}

/// What happens to the agenda when every calendar account fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaRetention {
    KeepLast,
    Clear,
}

impl AgendaRetention {
    pub fn from_keep_flag(keep: bool) -> Self {
        if keep {
            AgendaRetention::KeepLast
        } else {
            AgendaRetention::Clear
        }
    }
}

impl RefreshState {
    /// Build the state that follows `self` after one refresh cycle.
    ///
    /// A failed weather fetch keeps the previous snapshot. The agenda is
    /// replaced whenever at least one account answered, even with no events.
    pub fn next(
        &self,
        weather: Option<WeatherSnapshot>,
        agenda: AgendaFetch,
        retention: AgendaRetention,
        now: DateTime<Utc>,
    ) -> Self {
        let weather = weather.or_else(|| self.weather.clone());

        let agenda = if agenda.is_total_failure() && retention == AgendaRetention::KeepLast {
            self.agenda.clone()
        } else {
            agenda.agenda
        };

        Self {
            last_refresh_at: Some(now),
            weather,
            agenda,
        }
    }
}

pub type StateSender = watch::Sender<Arc<RefreshState>>;
pub type StateReceiver = watch::Receiver<Arc<RefreshState>>;

/// Channel carrying the latest committed state, starting empty.
pub fn state_channel() -> (StateSender, StateReceiver) {
    watch::channel(Arc::new(RefreshState::default()))
}
