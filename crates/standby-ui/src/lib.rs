//! Rendering and presentation for the standby display.
//!
//! The left half of the canvas carries an analog clock redrawn every
//! frame; the right half shows the last committed weather and agenda.

pub mod clock;
pub mod close_button;
pub mod fonts;
pub mod frame_loop;
pub mod locale;
pub mod palette;
pub mod panel;
pub mod screen;
pub mod text;

#[cfg(test)]
mod testing;

pub use clock::{draw_clock, ClockGeometry, HandAngles};
pub use close_button::CloseButton;
pub use fonts::{font_by_name, Fonts, DEFAULT_FONT};
pub use frame_loop::{FrameLoop, FrameOptions, FrameOutcome};
pub use locale::Strings;
pub use panel::draw_info_panel;
pub use screen::{InputEvent, Key, Screen};
pub use text::{draw_text, FreeTypeGlyphs, Glyph, GlyphSource};

#[cfg(feature = "simulator")]
pub use screen::SdlScreen;
