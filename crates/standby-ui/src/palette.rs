use embedded_graphics::pixelcolor::Rgb888;

pub const BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);
pub const HAND: Rgb888 = Rgb888::new(255, 255, 255);
pub const SECOND_HAND: Rgb888 = Rgb888::new(255, 0, 0);
pub const TEXT: Rgb888 = Rgb888::new(255, 255, 255);
pub const MUTED: Rgb888 = Rgb888::new(200, 200, 200);
pub const WORK_EVENT: Rgb888 = Rgb888::new(100, 200, 255);
pub const PERSONAL_EVENT: Rgb888 = Rgb888::new(255, 200, 100);
pub const CLOSE_FILL: Rgb888 = Rgb888::new(150, 30, 30);
