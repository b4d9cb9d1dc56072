//! Presentation surface and its input.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use standby_core::DisplayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Q,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The window was closed by the window manager.
    CloseRequested,
    KeyDown(Key),
    /// Primary-button press in canvas coordinates.
    Click(Point),
}

/// A canvas that can be drawn on, shown, and polled for input.
///
/// Dropping the screen releases the display.
pub trait Screen {
    type Target: DrawTarget<Color = Rgb888> + OriginDimensions;

    fn target(&mut self) -> &mut Self::Target;

    /// Show what has been drawn so far.
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Input received since the previous call.
    fn poll_input(&mut self) -> Vec<InputEvent>;
}

#[cfg(feature = "simulator")]
pub use sdl::SdlScreen;

#[cfg(feature = "simulator")]
mod sdl {
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;
    use embedded_graphics_simulator::sdl2::{Keycode, MouseButton};
    use embedded_graphics_simulator::{
        OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
    };
    use standby_core::DisplayError;

    use super::{InputEvent, Key, Screen};
    use crate::palette::BACKGROUND;

    /// SDL window via the embedded-graphics simulator.
    pub struct SdlScreen {
        display: SimulatorDisplay<Rgb888>,
        window: Window,
    }

    impl SdlScreen {
        pub fn open(title: &str, width: u32, height: u32) -> Result<Self, DisplayError> {
            if width == 0 || height == 0 {
                return Err(DisplayError::InvalidSize { width, height });
            }

            let mut display = SimulatorDisplay::new(Size::new(width, height));
            display
                .clear(BACKGROUND)
                .map_err(|e| DisplayError::InitFailed(format!("{:?}", e)))?;

            let output_settings = OutputSettingsBuilder::new().scale(1).build();
            let mut window = Window::new(title, &output_settings);

            // the window only exists after the first update
            window.update(&display);
            tracing::info!("Opened {}x{} display", width, height);

            Ok(Self { display, window })
        }
    }

    fn map_event(event: SimulatorEvent) -> Option<InputEvent> {
        match event {
            SimulatorEvent::Quit => Some(InputEvent::CloseRequested),
            SimulatorEvent::KeyDown { keycode, .. } => Some(InputEvent::KeyDown(match keycode {
                Keycode::Q => Key::Q,
                Keycode::Escape => Key::Escape,
                _ => Key::Other,
            })),
            SimulatorEvent::MouseButtonDown {
                mouse_btn: MouseButton::Left,
                point,
            } => Some(InputEvent::Click(point)),
            _ => None,
        }
    }

    impl Screen for SdlScreen {
        type Target = SimulatorDisplay<Rgb888>;

        fn target(&mut self) -> &mut Self::Target {
            &mut self.display
        }

        fn present(&mut self) -> Result<(), DisplayError> {
            self.window.update(&self.display);
            Ok(())
        }

        fn poll_input(&mut self) -> Vec<InputEvent> {
            self.window.events().filter_map(map_event).collect()
        }
    }
}
