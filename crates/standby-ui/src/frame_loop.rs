//! Fixed-rate presentation loop.
//!
//! Every frame redraws the clock half from the current time. The info
//! half is redrawn from the latest committed [`RefreshState`] only when
//! the wall-clock second has changed. The loop never waits on the
//! refresh side; it only borrows the current state.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use standby_core::{ConfigError, DisplayConfig, DisplayError};
use standby_services::StateReceiver;

use crate::clock::draw_clock;
use crate::close_button::CloseButton;
use crate::fonts::Fonts;
use crate::locale::Strings;
use crate::palette::BACKGROUND;
use crate::panel::draw_info_panel;
use crate::screen::{InputEvent, Key, Screen};

#[derive(Debug, Clone)]
pub struct FrameOptions {
    pub target_fps: u32,
    pub tz: Tz,
    pub fonts: Fonts,
    pub strings: Strings,
}

impl FrameOptions {
    pub fn from_config(config: &DisplayConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            target_fps: config.target_fps,
            tz: config.tz()?,
            fonts: Fonts::from_config(&config.font, config.cjk_font.as_deref()),
            strings: Strings::new(config.language),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Quit,
}

fn render_error<E: Debug>(e: E) -> DisplayError {
    DisplayError::RenderFailed(format!("{:?}", e))
}

pub struct FrameLoop<S: Screen> {
    screen: S,
    state: StateReceiver,
    options: FrameOptions,
    close_button: CloseButton,
    frame_interval: Duration,
    last_panel_second: Option<i64>,
    frames: u64,
    panel_renders: u64,
}

impl<S> FrameLoop<S>
where
    S: Screen,
    <S::Target as DrawTarget>::Error: Debug,
{
    pub fn new(mut screen: S, state: StateReceiver, options: FrameOptions) -> Self {
        let close_button = CloseButton::for_canvas(screen.target().size());
        let frame_interval = Duration::from_secs(1) / options.target_fps.max(1);
        Self {
            screen,
            state,
            options,
            close_button,
            frame_interval,
            last_panel_second: None,
            frames: 0,
            panel_renders: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn panel_renders(&self) -> u64 {
        self.panel_renders
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    fn halves(&mut self) -> (Rectangle, Rectangle) {
        let size = self.screen.target().size();
        let left_width = size.width / 2;
        (
            Rectangle::new(Point::zero(), Size::new(left_width, size.height)),
            Rectangle::new(
                Point::new(left_width as i32, 0),
                Size::new(size.width - left_width, size.height),
            ),
        )
    }

    fn is_quit(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::CloseRequested => true,
            InputEvent::KeyDown(Key::Q | Key::Escape) => true,
            InputEvent::KeyDown(Key::Other) => false,
            InputEvent::Click(point) => self.close_button.contains(*point),
        }
    }

    /// Run one frame for wall-clock time `now`.
    pub fn step(&mut self, now: DateTime<Utc>) -> Result<FrameOutcome, DisplayError> {
        for event in self.screen.poll_input() {
            if self.is_quit(&event) {
                tracing::info!("Quit requested: {:?}", event);
                return Ok(FrameOutcome::Quit);
            }
        }

        let (left, right) = self.halves();
        let local = now.with_timezone(&self.options.tz);
        let fonts = self.options.fonts.clone();
        let strings = self.options.strings;

        {
            let mut half = self.screen.target().cropped(&left);
            half.clear(BACKGROUND).map_err(render_error)?;
            draw_clock(&mut half, &local, &fonts, &strings).map_err(render_error)?;
        }

        let second = now.timestamp();
        if self.last_panel_second != Some(second) {
            let state = self.state.borrow().clone();
            let mut half = self.screen.target().cropped(&right);
            half.clear(BACKGROUND).map_err(render_error)?;
            draw_info_panel(&mut half, &state, &fonts, &strings).map_err(render_error)?;
            self.last_panel_second = Some(second);
            self.panel_renders += 1;
        }

        self.close_button
            .draw(self.screen.target())
            .map_err(render_error)?;
        self.screen.present()?;
        self.frames += 1;

        Ok(FrameOutcome::Continue)
    }

    /// Run frames at the target rate until quit. The screen is dropped
    /// when this returns.
    pub fn run(mut self) -> Result<(), DisplayError> {
        tracing::info!("Frame loop started at {} fps", self.options.target_fps);

        loop {
            let frame_start = Instant::now();
            if self.step(Utc::now())? == FrameOutcome::Quit {
                break;
            }
            if let Some(rest) = self.frame_interval.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        tracing::info!("Frame loop stopped after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::palette::{MUTED, SECOND_HAND, TEXT};
    use crate::testing::HeadlessScreen;
    use chrono::TimeZone;
    use standby_core::Language;
    use standby_services::{state_channel, RefreshState, StateSender};
    use standby_weather::WeatherSnapshot;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn options() -> FrameOptions {
        FrameOptions {
            target_fps: 60,
            tz: chrono_tz::UTC,
            fonts: Fonts::default(),
            strings: Strings::new(Language::En),
        }
    }

    fn frame_loop() -> (FrameLoop<HeadlessScreen>, StateSender) {
        let (tx, rx) = state_channel();
        (
            FrameLoop::new(HeadlessScreen::new(800, 480), rx, options()),
            tx,
        )
    }

    fn at(h: u32, m: u32, s: u32, millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 3, h, m, s).unwrap() + chrono::Duration::milliseconds(millis)
    }

    fn region(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_frame_interval_from_fps() {
        let (frames, _tx) = frame_loop();
        assert_eq!(frames.frame_interval, Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_first_frame_renders_everything() {
        let (mut frames, _tx) = frame_loop();
        assert_eq!(frames.step(at(10, 0, 0, 0)).unwrap(), FrameOutcome::Continue);

        assert_eq!(frames.frames(), 1);
        assert_eq!(frames.panel_renders(), 1);
        assert_eq!(frames.screen().presented, 1);

        let canvas = &frames.screen().canvas;
        // clock hub in the left half, close control in the corner
        assert_eq!(canvas.pixel(200, 240), Some(SECOND_HAND));
        assert!(canvas.count_in(region(755, 15, 30, 30), crate::palette::CLOSE_FILL) > 0);
        // empty cache: placeholder text in the right half
        assert!(canvas.count_in(region(420, 20, 200, 13), MUTED) > 0);
    }

    #[test]
    fn test_panel_redrawn_once_per_second_clock_every_frame() {
        let (mut frames, _tx) = frame_loop();

        frames.step(at(10, 0, 15, 0)).unwrap();
        // second hand pointing at 3 o'clock
        assert_eq!(frames.screen().canvas.pixel(300, 240), Some(SECOND_HAND));

        frames.step(at(10, 0, 15, 500)).unwrap();
        assert_eq!(frames.panel_renders(), 1);
        // the clock half was redrawn: the hand moved on
        assert_ne!(frames.screen().canvas.pixel(300, 240), Some(SECOND_HAND));

        for millis in [516, 533, 999] {
            frames.step(at(10, 0, 15, millis)).unwrap();
        }
        assert_eq!(frames.panel_renders(), 1);

        frames.step(at(10, 0, 16, 0)).unwrap();
        assert_eq!(frames.panel_renders(), 2);
        assert_eq!(frames.frames(), 6);
    }

    #[test]
    fn test_committed_state_appears_on_next_second() {
        let (mut frames, tx) = frame_loop();
        frames.step(at(10, 0, 0, 0)).unwrap();
        assert_eq!(
            frames.screen().canvas.count_in(region(420, 70, 300, 13), TEXT),
            0
        );

        tx.send_replace(Arc::new(RefreshState {
            last_refresh_at: Some(Utc::now()),
            weather: Some(WeatherSnapshot {
                temperature: 7,
                condition_text: "overcast clouds".to_string(),
                humidity_percent: 64,
                fetched_at: Utc::now(),
            }),
            agenda: Default::default(),
        }));

        // same second: panel untouched
        frames.step(at(10, 0, 0, 300)).unwrap();
        assert_eq!(
            frames.screen().canvas.count_in(region(420, 70, 300, 13), TEXT),
            0
        );

        frames.step(at(10, 0, 1, 0)).unwrap();
        let canvas = &frames.screen().canvas;
        assert!(canvas.count_in(region(420, 70, 300, 13), TEXT) > 0);
        assert_eq!(canvas.count_in(region(420, 20, 300, 13), MUTED), 0);
    }

    #[test]
    fn test_quit_inputs() {
        for event in [
            InputEvent::CloseRequested,
            InputEvent::KeyDown(Key::Q),
            InputEvent::KeyDown(Key::Escape),
            InputEvent::Click(Point::new(770, 30)),
        ] {
            let (mut frames, _tx) = frame_loop();
            frames.screen.push_frame_input(vec![event]);
            assert_eq!(frames.step(at(10, 0, 0, 0)).unwrap(), FrameOutcome::Quit);
            // exits within the frame, nothing presented
            assert_eq!(frames.screen().presented, 0);
        }
    }

    #[test]
    fn test_non_quit_inputs_ignored() {
        let (mut frames, _tx) = frame_loop();
        frames.screen.push_frame_input(vec![
            InputEvent::KeyDown(Key::Other),
            InputEvent::Click(Point::new(100, 100)),
            InputEvent::Click(Point::new(754, 30)),
        ]);
        assert_eq!(frames.step(at(10, 0, 0, 0)).unwrap(), FrameOutcome::Continue);
    }

    #[test]
    fn test_run_stops_and_releases_screen_once() {
        let (tx, rx) = state_channel();
        let mut screen = HeadlessScreen::new(800, 480);
        screen.push_frame_input(vec![]);
        screen.push_frame_input(vec![]);
        screen.push_frame_input(vec![InputEvent::KeyDown(Key::Q)]);
        let drops = screen.drop_counter();

        let frames = FrameLoop::new(screen, rx, options());
        frames.run().unwrap();

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        drop(tx);
    }
}
