//! Display strings per language.
//!
//! Labels stay inside Latin-1 so they render with the built-in bitmap
//! fonts whether or not a CJK font was found; Japanese is written in romaji.

use chrono::Weekday;
use standby_core::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    language: Language,
}

impl Strings {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn weekday(&self, day: Weekday) -> &'static str {
        let i = day.num_days_from_monday() as usize;
        match self.language {
            Language::En => [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ][i],
            Language::Ja => [
                "Getsuyobi",
                "Kayobi",
                "Suiyobi",
                "Mokuyobi",
                "Kin'yobi",
                "Doyobi",
                "Nichiyobi",
            ][i],
            Language::De => [
                "Montag",
                "Dienstag",
                "Mittwoch",
                "Donnerstag",
                "Freitag",
                "Samstag",
                "Sonntag",
            ][i],
            Language::Fr => [
                "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
            ][i],
        }
    }

    pub fn waiting_for_weather(&self) -> &'static str {
        match self.language {
            Language::En => "Waiting for weather...",
            Language::Ja => "Tenki o shutokuchu...",
            Language::De => "Warte auf Wetterdaten...",
            Language::Fr => "En attente de la météo...",
        }
    }

    pub fn schedule_header(&self) -> &'static str {
        match self.language {
            Language::En => "Today's schedule",
            Language::Ja => "Kyo no yotei",
            Language::De => "Heutige Termine",
            Language::Fr => "Programme du jour",
        }
    }

    pub fn no_events(&self) -> &'static str {
        match self.language {
            Language::En => "No events",
            Language::Ja => "Yotei wa arimasen",
            Language::De => "Keine Termine",
            Language::Fr => "Aucun événement",
        }
    }

    pub fn all_day(&self) -> &'static str {
        match self.language {
            Language::En => "All day",
            Language::Ja => "Shujitsu",
            Language::De => "Ganztägig",
            Language::Fr => "Journée",
        }
    }

    pub fn temperature(&self, celsius: i32) -> String {
        let label = match self.language {
            Language::En => "Temp",
            Language::Ja => "Kion",
            Language::De => "Temp.",
            Language::Fr => "Temp.",
        };
        format!("{}: {}°C", label, celsius)
    }

    pub fn humidity(&self, percent: u8) -> String {
        let label = match self.language {
            Language::En => "Humidity",
            Language::Ja => "Shitsudo",
            Language::De => "Feuchte",
            Language::Fr => "Humidité",
        };
        format!("{}: {}%", label, percent)
    }
}
