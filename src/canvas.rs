//! Off-screen pixel buffer bound to a rectangle of the display.

use alloc::{vec, vec::Vec};

use display_interface::WriteOnlyDataCommand;
use log::warn;

use crate::color::{Rgb, Rgba};
use crate::image::ImageSource;
use crate::{Error, Ili9488, Result, BYTES_PER_PIXEL};

/// Pixel buffer for the inclusive screen rectangle (x0, y0)..=(x1, y1).
///
/// Pixels are stored row-major, top-to-bottom and left-to-right, as R, G, B
/// bytes: the same layout the controller expects after a window is set, so a
/// flush is a single transfer of [`Canvas::buffer`].
///
/// A canvas does not borrow the display it was created from. Any number of
/// canvases can exist at once and each flush takes the display by `&mut`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
    width: usize,
    height: usize,
    buffer: Vec<u8>,
}

impl Canvas {
    /// Callers guarantee `x0 <= x1` and `y0 <= y1`.
    pub(crate) fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        let width = (x1 - x0) as usize + 1;
        let height = (y1 - y0) as usize + 1;
        Canvas {
            x0,
            y0,
            x1,
            y1,
            width,
            height,
            buffer: vec![0; width * height * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Screen rectangle `(x0, y0, x1, y1)`, both corners included.
    pub fn area(&self) -> (u16, u16, u16, u16) {
        (self.x0, self.y0, self.x1, self.y1)
    }

    /// Raw R, G, B bytes, `width * height * 3` long.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * BYTES_PER_PIXEL)
    }

    /// Stores a pixel as-is.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_rgb(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.buffer[i..i + BYTES_PER_PIXEL].copy_from_slice(&[r, g, b]);
                true
            }
            None => false,
        }
    }

    pub fn rgb(&self, x: usize, y: usize) -> Option<Rgb> {
        let i = self.index(x, y)?;
        Some(Rgb::new(
            self.buffer[i],
            self.buffer[i + 1],
            self.buffer[i + 2],
        ))
    }

    /// Composites `color` over the pixel currently stored at (x, y).
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_color(&mut self, x: usize, y: usize, color: Rgba) -> bool {
        let Some(background) = self.rgb(x, y) else {
            return false;
        };
        let Rgb { r, g, b } = color.over(background);
        self.set_rgb(x, y, r, g, b)
    }

    /// Stored pixel, always fully opaque.
    pub fn color(&self, x: usize, y: usize) -> Option<Rgba> {
        self.rgb(x, y).map(Rgba::from)
    }

    /// Stores an RGB565 pixel, expanded to 8 bits per channel.
    pub fn set_rgb565(&mut self, x: usize, y: usize, color: u16) -> bool {
        let Rgb { r, g, b } = Rgb::from_rgb565(color);
        self.set_rgb(x, y, r, g, b)
    }

    pub fn rgb565(&self, x: usize, y: usize) -> Option<u16> {
        self.rgb(x, y).map(Rgb::to_rgb565)
    }

    /// Composites every pixel of `image` that falls inside the canvas.
    ///
    /// Source coordinates map one to one onto canvas coordinates; anything
    /// outside the canvas or outside the source bounds is skipped.
    pub fn draw_image<I: ImageSource>(&mut self, image: &I) {
        let bounds = image.bounds();
        let y_end = bounds.max_y.min(self.height as i32);
        let x_end = bounds.max_x.min(self.width as i32);
        for y in bounds.min_y.max(0)..y_end {
            for x in bounds.min_x.max(0)..x_end {
                self.set_color(x as usize, y as usize, image.color_at(x, y));
            }
        }
    }

    /// Resets every pixel to black.
    pub fn clear(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_rgb(x, y, 0, 0, 0);
            }
        }
    }

    /// Sends the canvas buffer to its screen rectangle.
    pub fn flush<IFACE, RESET, BL>(&self, display: &mut Ili9488<IFACE, RESET, BL>) -> Result
    where
        IFACE: WriteOnlyDataCommand,
    {
        self.flush_directly(display, &self.buffer)
    }

    /// Sends `buffer` to the canvas's screen rectangle, leaving the canvas buffer untouched.
    ///
    /// `buffer` must use the canvas layout and be exactly `width * height * 3` bytes.
    pub fn flush_directly<IFACE, RESET, BL>(
        &self,
        display: &mut Ili9488<IFACE, RESET, BL>,
        buffer: &[u8],
    ) -> Result
    where
        IFACE: WriteOnlyDataCommand,
    {
        if buffer.len() != self.buffer.len() {
            warn!(
                "ili9488: refusing {} byte flush into a {}x{} canvas",
                buffer.len(),
                self.width,
                self.height
            );
            return Err(Error::BufferLength {
                expected: self.buffer.len(),
                actual: buffer.len(),
            });
        }
        if !display.fits(self.x0, self.y0, self.x1, self.y1) {
            warn!(
                "ili9488: canvas {:?} is outside the {}x{} screen",
                self.area(),
                display.width(),
                display.height()
            );
            return Err(Error::OutOfBounds);
        }
        display.flush_bit_buffer(self.x0, self.y0, self.x1, self.y1, buffer)
    }
}
