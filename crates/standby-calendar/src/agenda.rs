use serde::{Deserialize, Serialize};

use crate::types::CalendarEvent;

/// Today's events across all accounts, sorted by display time.
///
/// All-day events come first; events with equal times keep the order
/// they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAgenda {
    events: Vec<CalendarEvent>,
}

impl CalendarAgenda {
    pub fn new(mut events: Vec<CalendarEvent>) -> Self {
        // stable sort
        events.sort_by_key(|e| e.display_time);
        Self { events }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarEvent> {
        self.events.iter()
    }
}

impl FromIterator<CalendarEvent> for CalendarAgenda {
    fn from_iter<I: IntoIterator<Item = CalendarEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CalendarAgenda {
    type Item = &'a CalendarEvent;
    type IntoIter = std::slice::Iter<'a, CalendarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
