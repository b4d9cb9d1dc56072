//! Text drawing for strings the bitmap fonts cannot cover.
//!
//! The built-in mono fonts stop at Latin-1. Event titles and weather
//! descriptions are often Japanese, so every other character is drawn from
//! a [`GlyphSource`], normally a Noto Sans CJK face rasterised with
//! FreeType. Without one those characters come out as `?`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};

use standby_core::DisplayError;

/// Drawn in place of characters no font can supply.
pub const REPLACEMENT: char = '?';

/// Coverage at or above this is ink; the panel has no anti-aliasing.
const INK_THRESHOLD: u8 = 128;

/// Usual install locations of a CJK-capable font, most preferred first.
pub const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/opt/homebrew/Caskroom/font-noto-sans-cjk/2.004/NotoSansCJK.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
];

/// One rasterised character.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub size: Size,
    /// Top-left of the bitmap relative to the top-left of the text line.
    pub offset: Point,
    pub advance: u32,
    /// Row-major, one byte per pixel.
    pub coverage: Vec<u8>,
}

impl Glyph {
    fn ink(&self, origin: Point, color: Rgb888) -> impl Iterator<Item = Pixel<Rgb888>> + '_ {
        let width = self.size.width.max(1) as usize;
        let top_left = origin + self.offset;
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, c)| **c >= INK_THRESHOLD)
            .map(move |(i, _)| {
                let at = Point::new((i % width) as i32, (i / width) as i32);
                Pixel(top_left + at, color)
            })
    }
}

/// Supplies glyphs for characters outside Latin-1.
pub trait GlyphSource {
    /// `c` rendered for a text line `pixel_height` tall, or `None` when the
    /// font has no such character.
    fn glyph(&self, c: char, pixel_height: u32) -> Option<Rc<Glyph>>;
}

/// Glyphs from a TrueType/OpenType file, cached per character and size.
pub struct FreeTypeGlyphs {
    face: Face,
    // must outlive the face
    _library: Library,
    path: PathBuf,
    cache: RefCell<HashMap<(char, u32), Option<Rc<Glyph>>>>,
}

impl FreeTypeGlyphs {
    pub fn open(path: &Path) -> Result<Self, DisplayError> {
        let failed =
            |e: freetype::Error| DisplayError::InitFailed(format!("{}: {}", path.display(), e));
        let library = Library::init().map_err(failed)?;
        let face = library.new_face(path, 0).map_err(failed)?;

        Ok(Self {
            face,
            _library: library,
            path: path.to_path_buf(),
            cache: RefCell::default(),
        })
    }

    fn rasterize(&self, c: char, pixel_height: u32) -> Option<Glyph> {
        self.face.set_pixel_sizes(0, pixel_height).ok()?;
        let index = self.face.get_char_index(c as usize).filter(|i| *i != 0)?;
        if let Err(e) = self.face.load_glyph(index, LoadFlag::RENDER) {
            tracing::debug!("Failed to load glyph for {:?}: {}", c, e);
            return None;
        }

        let ascender = self
            .face
            .size_metrics()
            .map(|m| (m.ascender >> 6) as i32)
            .unwrap_or(pixel_height as i32);

        let slot = self.face.glyph();
        let bitmap = slot.bitmap();
        let width = bitmap.width().max(0) as usize;
        let rows = bitmap.rows().max(0) as usize;
        let pitch = bitmap.pitch().unsigned_abs() as usize;
        let buffer = bitmap.buffer();
        let mono = matches!(bitmap.pixel_mode(), Ok(PixelMode::Mono));

        let mut coverage = Vec::with_capacity(width * rows);
        for row in 0..rows {
            for col in 0..width {
                let value = if mono {
                    let byte = buffer.get(row * pitch + col / 8).copied().unwrap_or(0);
                    if byte & (0x80 >> (col % 8)) != 0 {
                        u8::MAX
                    } else {
                        0
                    }
                } else {
                    buffer.get(row * pitch + col).copied().unwrap_or(0)
                };
                coverage.push(value);
            }
        }

        Some(Glyph {
            size: Size::new(width as u32, rows as u32),
            offset: Point::new(slot.bitmap_left(), ascender - slot.bitmap_top()),
            advance: (slot.advance().x >> 6).max(0) as u32,
            coverage,
        })
    }
}

impl GlyphSource for FreeTypeGlyphs {
    fn glyph(&self, c: char, pixel_height: u32) -> Option<Rc<Glyph>> {
        self.cache
            .borrow_mut()
            .entry((c, pixel_height))
            .or_insert_with(|| self.rasterize(c, pixel_height).map(Rc::new))
            .clone()
    }
}

impl std::fmt::Debug for FreeTypeGlyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeTypeGlyphs")
            .field("path", &self.path)
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

/// Existing font files to try, the configured one first.
pub fn cjk_font_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = configured.filter(|p| !p.is_file()) {
        tracing::warn!("Configured CJK font {} not found", path.display());
    }

    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(CJK_FONT_CANDIDATES.iter().map(PathBuf::from))
        .filter(|p| p.is_file())
        .collect()
}

/// Open the first usable CJK font. Logs and returns `None` when there is
/// none, leaving non-Latin text to the replacement character.
pub fn load_cjk_glyphs(configured: Option<&Path>) -> Option<Rc<dyn GlyphSource>> {
    for path in cjk_font_candidates(configured) {
        match FreeTypeGlyphs::open(&path) {
            Ok(glyphs) => {
                tracing::info!("Using {} for non-Latin text", path.display());
                return Some(Rc::new(glyphs));
            }
            Err(e) => tracing::warn!("Skipping unusable font: {}", e),
        }
    }

    tracing::warn!(
        "No CJK font found; characters outside Latin-1 will show as '{}'",
        REPLACEMENT
    );
    None
}

fn in_bitmap_fonts(c: char) -> bool {
    (c as u32) < 0x100
}

fn flush<D>(
    target: &mut D,
    run: &mut String,
    at: Point,
    style: MonoTextStyle<'_, Rgb888>,
) -> Result<i32, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if run.is_empty() {
        return Ok(at.x);
    }
    let next = Text::with_baseline(run, at, style, Baseline::Top).draw(target)?;
    run.clear();
    Ok(next.x)
}

/// Draw `s` with its top-left corner at `position`.
///
/// Latin-1 runs use `font`; other characters come from `glyphs`, sized to
/// the font's line height. Returns the x coordinate after the last glyph.
pub fn draw_text<D>(
    target: &mut D,
    s: &str,
    position: Point,
    font: &'static MonoFont<'static>,
    color: Rgb888,
    glyphs: Option<&dyn GlyphSource>,
) -> Result<i32, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = MonoTextStyle::new(font, color);
    let line_height = font.character_size.height;
    let mut x = position.x;
    let mut run = String::new();

    for c in s.chars() {
        if in_bitmap_fonts(c) {
            run.push(c);
            continue;
        }
        match glyphs.and_then(|g| g.glyph(c, line_height)) {
            Some(glyph) => {
                x = flush(target, &mut run, Point::new(x, position.y), style)?;
                target.draw_iter(glyph.ink(Point::new(x, position.y), color))?;
                x += glyph.advance as i32;
            }
            None => run.push(REPLACEMENT),
        }
    }

    flush(target, &mut run, Point::new(x, position.y), style)
}
