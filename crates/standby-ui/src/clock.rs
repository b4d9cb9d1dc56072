//! Analog clock face.
//!
//! Hand angles are in degrees, 0° pointing right and growing clockwise
//! (screen y points down), so 12 o'clock is -90°.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::fonts::Fonts;
use crate::locale::Strings;
use crate::palette::{HAND, SECOND_HAND};

const DIAL_MARGIN: i32 = 50;
const TICK_LENGTH: i32 = 20;
const NUMERAL_INSET: i32 = 40;
const HOUR_HAND: f64 = 0.45;
const MINUTE_HAND: f64 = 0.65;
const SECOND_HAND_LENGTH: f64 = 0.75;
const HUB_RADIUS: u32 = 3;
const DATE_LINE_Y: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
}

impl HandAngles {
    /// Continuous hand positions for a wall-clock time. Every hand moves
    /// smoothly; none jumps at a unit boundary.
    pub fn at<T: Timelike>(time: &T) -> Self {
        // leap-second nanos (>= 1e9) are clamped into the same second
        let micros = (time.nanosecond().min(999_999_999) / 1_000) as f64;
        let second = time.second() as f64 + micros / 1e6;
        let minute = time.minute() as f64 + second / 60.0;
        let hour = (time.hour() % 12) as f64 + minute / 60.0;

        Self {
            hour: hour * 30.0 - 90.0,
            minute: minute * 6.0 - 90.0,
            second: second * 6.0 - 90.0,
        }
    }
}

/// Point at `radius` from `center` in direction `degrees`, rounded to
/// the nearest pixel.
pub fn polar(center: Point, radius: f64, degrees: f64) -> Point {
    let rad = degrees.to_radians();
    Point::new(
        center.x + (radius * rad.cos()).round() as i32,
        center.y + (radius * rad.sin()).round() as i32,
    )
}

/// Dial placement for a drawing area of `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockGeometry {
    pub center: Point,
    pub radius: i32,
}

impl ClockGeometry {
    pub fn for_size(size: Size) -> Self {
        let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
        let radius = (size.width.min(size.height) as i32 / 2 - DIAL_MARGIN).max(1);
        Self { center, radius }
    }

    pub fn hand_tip(&self, angle: f64, length: f64) -> Point {
        polar(self.center, self.radius as f64 * length, angle)
    }
}

/// `YYYY-MM-DD (Weekday)`.
pub fn date_line<Tz: TimeZone>(now: &DateTime<Tz>, strings: &Strings) -> String {
    format!(
        "{:04}-{:02}-{:02} ({})",
        now.year(),
        now.month(),
        now.day(),
        strings.weekday(now.weekday())
    )
}

/// Draw the dial, numerals, hands and date line for `now`.
///
/// Coordinates are relative to the target's bounding box.
pub fn draw_clock<D, Tz>(
    target: &mut D,
    now: &DateTime<Tz>,
    fonts: &Fonts,
    strings: &Strings,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
    Tz: TimeZone,
{
    let size = target.bounding_box().size;
    let geometry = ClockGeometry::for_size(size);
    let center = geometry.center;
    let r = geometry.radius;

    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(
        &date_line(now, strings),
        Point::new(size.width as i32 / 2, DATE_LINE_Y),
        MonoTextStyle::new(fonts.large, HAND),
        centered,
    )
    .draw(target)?;

    Circle::with_center(center, (2 * r + 1) as u32)
        .into_styled(PrimitiveStyle::with_stroke(HAND, 2))
        .draw(target)?;

    let numeral_style = MonoTextStyle::new(fonts.small, HAND);
    let numeral_align = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();

    for i in 0..12 {
        let angle = (i * 30 - 90) as f64;
        Line::new(
            polar(center, (r - TICK_LENGTH) as f64, angle),
            polar(center, r as f64, angle),
        )
        .into_styled(PrimitiveStyle::with_stroke(HAND, 1))
        .draw(target)?;

        let numeral = if i == 0 { 12 } else { i };
        Text::with_text_style(
            &numeral.to_string(),
            polar(center, (r - NUMERAL_INSET) as f64, angle),
            numeral_style,
            numeral_align,
        )
        .draw(target)?;
    }

    let angles = HandAngles::at(now);
    for (angle, length, color, width) in [
        (angles.hour, HOUR_HAND, HAND, 2),
        (angles.minute, MINUTE_HAND, HAND, 2),
        (angles.second, SECOND_HAND_LENGTH, SECOND_HAND, 1),
    ] {
        Line::new(center, geometry.hand_tip(angle, length))
            .into_styled(PrimitiveStyle::with_stroke(color, width))
            .draw(target)?;
    }

    Circle::with_center(center, 2 * HUB_RADIUS + 1)
        .into_styled(PrimitiveStyle::with_fill(SECOND_HAND))
        .draw(target)?;

    Ok(())
}
