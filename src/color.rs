//! Color values and the arithmetic shared by the canvas and the driver.

/// Opaque 8-bit-per-channel color, the layout the controller receives on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs into RGB565, dropping the low bits of each channel.
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 & 0xf8) << 8) | ((self.g as u16 & 0xfc) << 3) | (self.b as u16 >> 3)
    }

    /// Expands RGB565 to 8 bits per channel by replicating the high bits into the low bits,
    /// so that full intensity maps to 255.
    pub const fn from_rgb565(value: u16) -> Self {
        let r = ((value >> 11) & 0x1f) as u8;
        let g = ((value >> 5) & 0x3f) as u8;
        let b = (value & 0x1f) as u8;
        Self {
            r: (r << 3) | (r >> 2),
            g: (g << 2) | (g >> 4),
            b: (b << 3) | (b >> 2),
        }
    }

    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

/// Non-premultiplied color with an 8-bit alpha channel. `a == 255` is fully opaque.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Composites `self` over an opaque background ("over" operator).
    pub fn over(self, background: Rgb) -> Rgb {
        Rgb {
            r: blend_channel(self.r, background.r, self.a),
            g: blend_channel(self.g, background.g, self.a),
            b: blend_channel(self.b, background.b, self.a),
        }
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        c.with_alpha(0xff)
    }
}

#[inline]
fn blend_channel(fg: u8, bg: u8, alpha: u8) -> u8 {
    let alpha = alpha as u16;
    // 255 * 255 + 0 fits in u16 and the quotient is always <= 255.
    ((fg as u16 * alpha + bg as u16 * (0xff - alpha)) / 0xff) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_foreground_replaces_background() {
        let fg = Rgba::opaque(12, 200, 77);
        for bg in [Rgb::BLACK, Rgb::new(255, 255, 255), Rgb::new(1, 2, 3)] {
            assert_eq!(fg.over(bg), fg.rgb());
        }
    }

    #[test]
    fn transparent_foreground_keeps_background() {
        let bg = Rgb::new(9, 99, 199);
        assert_eq!(Rgba::new(255, 0, 255, 0).over(bg), bg);
    }

    #[test]
    fn half_alpha_red_over_black() {
        let out = Rgba::new(255, 0, 0, 128).over(Rgb::BLACK);
        assert!((127..=129).contains(&out.r));
        assert_eq!((out.g, out.b), (0, 0));
    }

    #[test]
    fn rgb565_extremes_expand_to_full_range() {
        assert_eq!(Rgb::from_rgb565(0xffff), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::from_rgb565(0x0000), Rgb::BLACK);
        assert_eq!(Rgb::from_rgb565(0xf800), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_rgb565(0x07e0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_rgb565(0x001f), Rgb::new(0, 0, 255));
    }

    #[test]
    fn rgb565_packing_keeps_high_bits() {
        assert_eq!(Rgb::new(255, 255, 255).to_rgb565(), 0xffff);
        assert_eq!(Rgb::new(0x80, 0x80, 0x90).to_rgb565(), 0x8412);
        assert_eq!(Rgb::from_rgb565(0x8412).to_rgb565(), 0x8412);
    }
}
