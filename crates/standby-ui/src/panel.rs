//! Right half of the screen: current weather above, today's agenda below.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use standby_calendar::{CalendarEvent, DisplayTime};
use standby_services::RefreshState;

use crate::fonts::Fonts;
use crate::locale::Strings;
use crate::palette::{MUTED, PERSONAL_EVENT, TEXT, WORK_EVENT};
use crate::text::draw_text;

const LEFT: i32 = 20;
const WEATHER_TOP: i32 = 20;
const DETAILS_TOP: i32 = 70;
const HUMIDITY_LEFT: i32 = 170;
const HEADER_ABOVE_ROWS: i32 = 50;
const ROW_HEIGHT: i32 = 40;
const TITLE_LEFT: i32 = 120;

fn text<D>(
    target: &mut D,
    fonts: &Fonts,
    s: &str,
    position: Point,
    font: &'static MonoFont<'static>,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_text(target, s, position, font, color, fonts.glyphs())?;
    Ok(())
}

/// Colour of an agenda title by account.
pub fn event_color(event: &CalendarEvent) -> Rgb888 {
    if event.source.is_work() {
        WORK_EVENT
    } else {
        PERSONAL_EVENT
    }
}

/// Number of agenda rows that fit below the header.
pub fn visible_rows(height: u32) -> usize {
    let first = height as i32 / 2;
    ((height as i32 - first) / ROW_HEIGHT).max(0) as usize
}

/// Draw weather and agenda from `state`. Coordinates are relative to the
/// target's bounding box; the caller clears the area first.
pub fn draw_info_panel<D>(
    target: &mut D,
    state: &RefreshState,
    fonts: &Fonts,
    strings: &Strings,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let height = target.bounding_box().size.height;

    match &state.weather {
        Some(weather) => {
            text(
                target,
                fonts,
                &weather.condition_text,
                Point::new(LEFT, WEATHER_TOP),
                fonts.large,
                TEXT,
            )?;
            text(
                target,
                fonts,
                &strings.temperature(weather.temperature),
                Point::new(LEFT, DETAILS_TOP),
                fonts.small,
                TEXT,
            )?;
            text(
                target,
                fonts,
                &strings.humidity(weather.humidity_percent),
                Point::new(HUMIDITY_LEFT, DETAILS_TOP),
                fonts.small,
                TEXT,
            )?;
        }
        None => {
            text(
                target,
                fonts,
                strings.waiting_for_weather(),
                Point::new(LEFT, WEATHER_TOP),
                fonts.small,
                MUTED,
            )?;
        }
    }

    let rows_top = height as i32 / 2;
    text(
        target,
        fonts,
        strings.schedule_header(),
        Point::new(LEFT, rows_top - HEADER_ABOVE_ROWS),
        fonts.large,
        TEXT,
    )?;

    if state.agenda.is_empty() {
        text(
            target,
            fonts,
            strings.no_events(),
            Point::new(LEFT, rows_top),
            fonts.small,
            MUTED,
        )?;
        return Ok(());
    }

    for (i, event) in state
        .agenda
        .iter()
        .take(visible_rows(height))
        .enumerate()
    {
        let y = rows_top + i as i32 * ROW_HEIGHT;
        let time = match event.display_time {
            DisplayTime::AllDay => strings.all_day().to_string(),
            at => at.label(),
        };
        text(target, fonts, &time, Point::new(LEFT, y), fonts.small, TEXT)?;
        text(
            target,
            fonts,
            &event.title,
            Point::new(TITLE_LEFT, y),
            fonts.small,
            event_color(event),
        )?;
    }

    Ok(())
}
