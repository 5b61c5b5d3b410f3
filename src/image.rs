//! Two-dimensional color sources that can be composed into a [`Canvas`](crate::Canvas).

use crate::color::Rgba;

/// Half-open rectangle `[min_x, max_x) x [min_y, max_y)` in source coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds anchored at the origin.
    ///
    /// Sizes beyond `i32::MAX` saturate.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..self.max_x).contains(&x) && (self.min_y..self.max_y).contains(&y)
    }
}

/// A source of colors addressed in the same coordinate space as the canvas it is drawn into.
pub trait ImageSource {
    fn bounds(&self) -> Bounds;

    /// Color at `(x, y)`. Only called for coordinates inside [`ImageSource::bounds`].
    fn color_at(&self, x: i32, y: i32) -> Rgba;
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    fn bounds(&self) -> Bounds {
        (**self).bounds()
    }

    fn color_at(&self, x: i32, y: i32) -> Rgba {
        (**self).color_at(x, y)
    }
}

/// Borrowed row-major RGBA image, four bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImage<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> RgbaImage<'a> {
    /// Wraps `data`. Returns `None` unless `data.len() == width * height * 4`.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Option<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))?;
        if data.len() != len {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl ImageSource for RgbaImage<'_> {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }

    fn color_at(&self, x: i32, y: i32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        )
    }
}
