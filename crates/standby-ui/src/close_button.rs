use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, RoundedRectangle};

use crate::palette::{CLOSE_FILL, HAND};

const SIZE: u32 = 30;
const MARGIN: i32 = 15;
const CORNER_RADIUS: u32 = 5;
const CROSS_INSET: i32 = 8;

/// The on-screen control that quits the display, anchored to the top-right
/// corner of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseButton {
    area: Rectangle,
}

impl CloseButton {
    pub fn for_canvas(canvas: Size) -> Self {
        let x = canvas.width as i32 - SIZE as i32 - MARGIN;
        Self {
            area: Rectangle::new(Point::new(x, MARGIN), Size::new(SIZE, SIZE)),
        }
    }

    pub fn area(&self) -> Rectangle {
        self.area
    }

    pub fn contains(&self, point: Point) -> bool {
        self.area.contains(point)
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        RoundedRectangle::with_equal_corners(self.area, Size::new(CORNER_RADIUS, CORNER_RADIUS))
            .into_styled(PrimitiveStyle::with_fill(CLOSE_FILL))
            .draw(target)?;

        let tl = self.area.top_left;
        let far = SIZE as i32 - CROSS_INSET;
        let stroke = PrimitiveStyle::with_stroke(HAND, 2);
        Line::new(
            tl + Point::new(CROSS_INSET, CROSS_INSET),
            tl + Point::new(far, far),
        )
        .into_styled(stroke)
        .draw(target)?;
        Line::new(
            tl + Point::new(CROSS_INSET, far),
            tl + Point::new(far, CROSS_INSET),
        )
        .into_styled(stroke)
        .draw(target)?;

        Ok(())
    }
}
