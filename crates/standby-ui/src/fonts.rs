use std::path::Path;
use std::rc::Rc;

use embedded_graphics::mono_font::iso_8859_1::{
    FONT_10X20, FONT_6X10, FONT_6X13, FONT_7X13, FONT_7X14, FONT_8X13, FONT_9X15, FONT_9X18,
    FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::MonoFont;

use crate::text::{load_cjk_glyphs, GlyphSource};

pub const DEFAULT_FONT: &str = "10x20";

/// Font used for agenda rows, weather details and dial numerals.
const SMALL_FONT: &MonoFont<'static> = &FONT_8X13;

/// Built-in bitmap fonts by name.
pub fn font_by_name(name: &str) -> Option<&'static MonoFont<'static>> {
    let font = match name.trim().to_ascii_lowercase().as_str() {
        "6x10" => &FONT_6X10,
        "6x13" => &FONT_6X13,
        "7x13" => &FONT_7X13,
        "7x14" => &FONT_7X14,
        "8x13" => &FONT_8X13,
        "9x15" => &FONT_9X15,
        "9x18" => &FONT_9X18,
        "9x18bold" | "9x18_bold" => &FONT_9X18_BOLD,
        "10x20" => &FONT_10X20,
        _ => return None,
    };
    Some(font)
}

/// Resolve the configured primary font, falling back to the default
/// with a warning when the name is unknown.
fn large_font(name: &str) -> &'static MonoFont<'static> {
    font_by_name(name).unwrap_or_else(|| {
        tracing::warn!("Unknown font '{}', using {}", name, DEFAULT_FONT);
        &FONT_10X20
    })
}

/// The two text sizes the display uses, plus glyphs for everything the
/// bitmap fonts lack.
#[derive(Clone)]
pub struct Fonts {
    pub large: &'static MonoFont<'static>,
    pub small: &'static MonoFont<'static>,
    glyphs: Option<Rc<dyn GlyphSource>>,
}

impl Fonts {
    /// Bitmap fonts from `name`, CJK glyphs from `cjk_font` or the first
    /// installed Noto Sans CJK.
    pub fn from_config(name: &str, cjk_font: Option<&Path>) -> Self {
        Self {
            large: large_font(name),
            small: SMALL_FONT,
            glyphs: load_cjk_glyphs(cjk_font),
        }
    }

    pub fn with_glyphs(mut self, glyphs: Rc<dyn GlyphSource>) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    pub fn glyphs(&self) -> Option<&dyn GlyphSource> {
        self.glyphs.as_deref()
    }
}

/// Bitmap fonts only; nothing is read from disk.
impl Default for Fonts {
    fn default() -> Self {
        Self {
            large: large_font(DEFAULT_FONT),
            small: SMALL_FONT,
            glyphs: None,
        }
    }
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts")
            .field("large", &self.large.character_size)
            .field("small", &self.small.character_size)
            .field("cjk", &self.glyphs.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::geometry::Size;

    #[test]
    fn test_known_font() {
        assert_eq!(large_font("9x15").character_size, Size::new(9, 15));
    }

    #[test]
    fn test_name_is_case_insensitive() {
        assert!(font_by_name(" 9X18Bold ").is_some());
    }

    #[test]
    fn test_unknown_font_falls_back() {
        assert_eq!(large_font("Noto Sans CJK").character_size, Size::new(10, 20));
    }

    #[test]
    fn test_default_has_no_cjk_glyphs() {
        let fonts = Fonts::default();
        assert_eq!(fonts.small.character_size, Size::new(8, 13));
        assert!(fonts.glyphs().is_none());
        assert!(format!("{:?}", fonts).contains("cjk: false"));
    }
}
