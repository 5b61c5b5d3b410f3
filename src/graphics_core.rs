use core::convert::Infallible;

use display_interface::WriteOnlyDataCommand;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
    primitives::Rectangle,
    Pixel,
};

use crate::{Canvas, Error, Ili9488};

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let _ = self.set_rgb(
                point.x as usize,
                point.y as usize,
                color.r(),
                color.g(),
                color.b(),
            );
        }

        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<IFACE, RESET, BL> DrawTarget for Ili9488<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
{
    type Color = Rgb888;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            let (x, y) = (point.x as u16, point.y as u16);
            self.flush_bit_buffer(x, y, x, y, &[color.r(), color.g(), color.b()])?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let drawable = area.intersection(&self.bounding_box());
        let Some(bottom_right) = drawable.bottom_right() else {
            return Ok(());
        };
        let top_left = drawable.top_left;

        let area = *area;
        let mut bytes = area
            .rows()
            .flat_map(move |y| area.columns().map(move |x| Point::new(x, y)))
            .zip(colors)
            .filter(|(point, _)| drawable.contains(*point))
            .flat_map(|(_, color)| [color.r(), color.g(), color.b()]);

        self.draw_raw_iter(
            top_left.x as u16,
            top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
            &mut bytes,
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_screen(color.r(), color.g(), color.b())
    }
}

impl<IFACE, RESET, BL> OriginDimensions for Ili9488<IFACE, RESET, BL> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Event};
    use crate::Rgb;
    use embedded_graphics::{
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    #[test]
    fn canvas_draws_primitives_into_its_buffer() {
        let mut canvas = Canvas::new(0, 0, 3, 3);

        Rectangle::new(Point::new(1, 1), Size::new(2, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut canvas)
            .unwrap();

        for y in 0..4 {
            for x in 0..4 {
                let expected = if (1..3).contains(&x) && (1..3).contains(&y) {
                    Rgb::new(255, 0, 0)
                } else {
                    Rgb::BLACK
                };
                assert_eq!(canvas.rgb(x, y), Some(expected), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn canvas_ignores_points_outside() {
        let mut canvas = Canvas::new(0, 0, 1, 1);

        Pixel(Point::new(-1, 0), Rgb888::WHITE)
            .draw(&mut canvas)
            .unwrap();
        Pixel(Point::new(2, 0), Rgb888::WHITE)
            .draw(&mut canvas)
            .unwrap();

        assert!(canvas.buffer().iter().all(|&b| b == 0));
        assert_eq!(OriginDimensions::size(&canvas), Size::new(2, 2));
    }

    #[test]
    fn display_fill_is_clipped_to_the_screen() {
        let (mut lcd, log) = mock::display();

        Rectangle::new(Point::new(318, -1), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::BLUE))
            .draw(&mut lcd)
            .unwrap();

        assert_eq!(
            mock::take(&log),
            [
                Event::Command(vec![0x2a]),
                Event::Data(vec![0x01, 0x3e, 0x01, 0x3f]),
                Event::Command(vec![0x2b]),
                Event::Data(vec![0, 0, 0, 0]),
                Event::Command(vec![0x2c]),
                Event::Data(vec![0, 0, 255, 0, 0, 255]),
            ]
        );
    }

    #[test]
    fn display_pixel_sets_a_one_pixel_window() {
        let (mut lcd, log) = mock::display();

        Pixel(Point::new(5, 6), Rgb888::new(1, 2, 3))
            .draw(&mut lcd)
            .unwrap();
        Pixel(Point::new(320, 0), Rgb888::WHITE)
            .draw(&mut lcd)
            .unwrap();

        let events = mock::take(&log);
        assert_eq!(events.len(), 6);
        assert_eq!(events[1], Event::Data(vec![0, 5, 0, 5]));
        assert_eq!(events[3], Event::Data(vec![0, 6, 0, 6]));
        assert_eq!(events[5], Event::Data(vec![1, 2, 3]));
    }
}
