use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// `[local midnight, next local midnight)` of the calendar day containing
/// `now` in `tz`, as UTC instants.
pub fn day_window(now: DateTime<Utc>, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);
    (start_of_day(today, tz), start_of_day(tomorrow, tz))
}

/// First instant of `date` in `tz`. Where midnight falls in a DST gap the
/// day starts at the first valid local time after it.
fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    for minutes in (0..=180).step_by(15) {
        let candidate = midnight + chrono::Duration::minutes(minutes);
        if let Some(local) = tz.from_local_datetime(&candidate).earliest() {
            return local.with_timezone(&Utc);
        }
    }

    tz.from_utc_datetime(&midnight).with_timezone(&Utc)
}
