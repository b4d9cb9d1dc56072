//! Background refresh for the display: shared state, scheduling and the
//! loop that keeps weather and calendar data current.

pub mod refresh;
pub mod retry;
pub mod scheduler;
pub mod sources;
pub mod state;

pub use refresh::RefreshLoop;
pub use retry::{with_retry, RetryConfig};
pub use scheduler::{RefreshPhase, RefreshScheduler};
pub use sources::{AgendaSource, WeatherSource};
pub use state::{state_channel, AgendaRetention, RefreshState, StateReceiver, StateSender};
