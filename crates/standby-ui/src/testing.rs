//! In-memory draw target and screen for tests.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use standby_core::DisplayError;

use crate::palette::BACKGROUND;
use crate::screen::{InputEvent, Screen};

#[derive(PartialEq)]
pub struct Canvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![BACKGROUND; (width * height) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    pub fn count_in(&self, area: Rectangle, color: Rgb888) -> usize {
        area.points()
            .filter(|p| self.pixel(p.x, p.y) == Some(color))
            .count()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point.x, point.y) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }
}

/// Screen backed by a [`Canvas`] that replays scripted input, one batch
/// per frame.
pub struct HeadlessScreen {
    pub canvas: Canvas,
    pub presented: u32,
    input: VecDeque<Vec<InputEvent>>,
    drops: Arc<AtomicU32>,
}

impl HeadlessScreen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            presented: 0,
            input: VecDeque::new(),
            drops: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queue the input returned by the next unanswered poll.
    pub fn push_frame_input(&mut self, events: Vec<InputEvent>) {
        self.input.push_back(events);
    }

    /// Counter incremented when this screen is dropped.
    pub fn drop_counter(&self) -> Arc<AtomicU32> {
        self.drops.clone()
    }
}

impl Drop for HeadlessScreen {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl Screen for HeadlessScreen {
    type Target = Canvas;

    fn target(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.presented += 1;
        Ok(())
    }

    fn poll_input(&mut self) -> Vec<InputEvent> {
        self.input.pop_front().unwrap_or_default()
    }
}
