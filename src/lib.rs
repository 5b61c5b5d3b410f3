#![cfg_attr(not(test), no_std)]

//! ILI9488 Display Driver
//!
//! ### Usage
//!
//! To control the display you need to set up:
//!
//! * Interface for communicating with display ([display-interface-spi crate] for SPI)
//! * Reset and backlight pins, a delay provider, the orientation and the panel size
//!
//! ```ignore
//! let iface = SPIInterface::new(spi, dc, cs);
//!
//! let mut display = Ili9488::new(
//!     iface,
//!     reset_gpio,
//!     backlight_gpio,
//!     &mut delay,
//!     Orientation::Portrait,
//!     ili9488::DisplaySize320x480,
//! )
//! .unwrap();
//!
//! display.clear_screen(0xff, 0x00, 0x00).unwrap();
//!
//! let mut canvas = display.canvas(10, 10, 109, 59).unwrap();
//! canvas.set_color(5, 5, ili9488::Rgba::new(0, 0, 255, 128));
//! canvas.flush(&mut display).unwrap();
//! ```
//!
//! The SPI bus must be configured with [`SPI_MODE`]; the controller accepts
//! clocks up to [`SPI_CLOCK_HZ`].
//!
//! [display-interface-spi crate]: https://crates.io/crates/display-interface-spi
extern crate alloc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use display_interface::DataFormat::{U8Iter, U8};
use display_interface::WriteOnlyDataCommand;
use display_interface_spi::SPIInterface;
use log::{debug, trace};

mod canvas;
pub mod color;
pub mod image;

#[cfg(feature = "graphics")]
mod graphics_core;

#[cfg(test)]
mod mock;

pub use canvas::Canvas;
pub use color::{Rgb, Rgba};
pub use image::{Bounds, ImageSource, RgbaImage};

pub use embedded_hal::spi::MODE_0 as SPI_MODE;

pub use display_interface::DisplayError;

/// Fastest write clock the controller is driven with.
pub const SPI_CLOCK_HZ: u32 = 40_000_000;

/// Bytes per pixel on the wire (pixel format 0x66, one byte per channel).
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors reported by the driver and its canvases.
#[derive(Debug)]
pub enum Error {
    /// The display interface failed to write, or the reset line could not be driven.
    Interface(DisplayError),
    /// The backlight line could not be driven.
    Backlight,
    /// A rectangle is inverted or does not fit the current screen size.
    OutOfBounds,
    /// A pixel buffer does not match the size of the window it is written to.
    BufferLength { expected: usize, actual: usize },
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Interface(e)
    }
}

type Result<T = (), E = Error> = core::result::Result<T, E>;

/// Trait that defines display size information
pub trait DisplaySize {
    /// Width in pixels, in the default (portrait) orientation
    const WIDTH: usize;
    /// Height in pixels, in the default (portrait) orientation
    const HEIGHT: usize;
    /// Column offset of the visible area inside controller memory
    const OFFSET_X: u16 = 0;
    /// Row offset of the visible area inside controller memory
    const OFFSET_Y: u16 = 0;
}

/// Generic display size of 320x480 pixels
pub struct DisplaySize320x480;

impl DisplaySize for DisplaySize320x480 {
    const WIDTH: usize = 320;
    const HEIGHT: usize = 480;
}

/// Memory access control value for a mounting orientation.
///
/// Implement this for boards that need a different scan direction or color order.
pub trait Mode {
    fn mode(&self) -> u8;

    fn is_landscape(&self) -> bool;
}

const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;
const MADCTL_BGR: u8 = 0x08;

/// The default implementation of the Mode trait from above
///
/// `PortraitFlipped` and `LandscapeFlipped` share one register value (MY | MV)
/// and both report landscape dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl From<u8> for Orientation {
    /// Rotation selector in quarter turns, taken modulo 4.
    fn from(selector: u8) -> Self {
        match selector % 4 {
            0 => Self::Portrait,
            1 => Self::Landscape,
            2 => Self::PortraitFlipped,
            _ => Self::LandscapeFlipped,
        }
    }
}

impl Mode for Orientation {
    fn mode(&self) -> u8 {
        match self {
            Self::Portrait => MADCTL_BGR,
            Self::Landscape => MADCTL_MX | MADCTL_MV | MADCTL_BGR,
            Self::PortraitFlipped | Self::LandscapeFlipped => MADCTL_MY | MADCTL_MV | MADCTL_BGR,
        }
    }

    fn is_landscape(&self) -> bool {
        !matches!(self, Self::Portrait)
    }
}

/// Specify state of specific mode of operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeState {
    On,
    Off,
}

/// Power, frame-rate and gamma setup sent after every hard reset.
const INIT_SEQUENCE: &[(Command, &[u8])] = &[
    (Command::AdjustControl3, &[0xa9, 0x51, 0x2c, 0x82]),
    (Command::PowerControl1, &[0x11, 0x09]),
    (Command::PowerControl2, &[0x41]),
    (Command::VCOMControl1, &[0x00, 0x0a, 0x80]),
    (Command::NormalModeFrameRate, &[0xb0, 0x11]),
    (Command::DisplayInversionControl, &[0x02]),
    (Command::DisplayFunctionControl, &[0x02, 0x42]),
    (Command::EntryModeSet, &[0xc6]),
    (Command::HSLanesControl, &[0x00, 0x04]),
    (Command::SetImageFunction, &[0x00]),
    (
        Command::MemoryAccessControl,
        &[MADCTL_MX | MADCTL_MV | MADCTL_BGR],
    ),
    // 18 bits per pixel, transferred as three bytes
    (Command::PixelFormatSet, &[0x66]),
    (
        Command::PositiveGammaControl,
        &[
            0x00, 0x07, 0x10, 0x09, 0x17, 0x0b, 0x41, 0x89, 0x4b, 0x0a, 0x0c, 0x0e, 0x18, 0x1b,
            0x0f,
        ],
    ),
    (
        Command::NegativeGammaControl,
        &[
            0x00, 0x17, 0x1a, 0x04, 0x0e, 0x06, 0x2f, 0x45, 0x43, 0x02, 0x0a, 0x09, 0x32, 0x36,
            0x0f,
        ],
    ),
];

/// The hardware makes it efficient to draw rectangles on the screen.
///
/// What happens is the following:
///
/// - A drawing window is prepared (with the 2 opposite corner coordinates)
/// - The starting point for drawing is the top left corner of this window
/// - Every three bytes received are interpreted as one R, G, B pixel
/// - As soon as a pixel is received, an internal counter is incremented,
///   and the next pixel lands on the adjacent one on the right, or
///   the first of the next row if the row ended
///
/// Pixels are usually accumulated in a [`Canvas`] and sent in one transfer.
pub struct Ili9488<IFACE, RESET, BL> {
    interface: IFACE,
    reset: RESET,
    backlight: BL,
    width: usize,
    height: usize,
    native_width: usize,
    native_height: usize,
    offset_x: u16,
    offset_y: u16,
}

impl<IFACE, RESET, BL> Ili9488<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
    RESET: OutputPin,
    BL: OutputPin,
{
    /// Turns the backlight on, resets the controller and runs the power-up sequence.
    pub fn new<DELAY, SIZE, MODE>(
        interface: IFACE,
        reset: RESET,
        backlight: BL,
        delay: &mut DELAY,
        mode: MODE,
        _display_size: SIZE,
    ) -> Result<Self>
    where
        DELAY: DelayMs<u8>,
        SIZE: DisplaySize,
        MODE: Mode,
    {
        let mut ili9488 = Ili9488 {
            interface,
            reset,
            backlight,
            width: SIZE::WIDTH,
            height: SIZE::HEIGHT,
            native_width: SIZE::WIDTH,
            native_height: SIZE::HEIGHT,
            offset_x: SIZE::OFFSET_X,
            offset_y: SIZE::OFFSET_Y,
        };

        ili9488.backlight(ModeState::On)?;
        ili9488.begin(delay, mode)?;

        Ok(ili9488)
    }

    fn begin<DELAY, MODE>(&mut self, delay: &mut DELAY, mode: MODE) -> Result
    where
        DELAY: DelayMs<u8>,
        MODE: Mode,
    {
        self.hard_reset(delay)?;

        debug!("ili9488: sending {} init registers", INIT_SEQUENCE.len());
        self.apply_sequence(INIT_SEQUENCE)?;

        self.sleep_mode(ModeState::Off)?;

        // The panel needs 120ms to settle after Sleep Out
        delay.delay_ms(120);

        self.display_mode(ModeState::On)?;
        self.set_orientation(mode)
    }

    /// Pulses the reset line: low for 100ms, then high and 50ms before the first command.
    pub fn hard_reset<DELAY>(&mut self, delay: &mut DELAY) -> Result
    where
        DELAY: DelayMs<u8>,
    {
        debug!("ili9488: hard reset");
        self.reset.set_low().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(100);
        // Set high for normal operation
        self.reset.set_high().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(50);
        Ok(())
    }

    /// Switch the backlight line
    pub fn backlight(&mut self, state: ModeState) -> Result {
        let res = match state {
            ModeState::On => self.backlight.set_high(),
            ModeState::Off => self.backlight.set_low(),
        };
        res.map_err(|_| Error::Backlight)
    }
}

impl<SPI, DC, CS, RESET, BL> Ili9488<SPIInterface<SPI, DC, CS>, RESET, BL>
where
    SPI: spi::Write<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RESET: OutputPin,
    BL: OutputPin,
{
    /// Same as [`Ili9488::new`], wrapping a 4-wire SPI bus in an [`SPIInterface`].
    #[allow(clippy::too_many_arguments)]
    pub fn with_spi<DELAY, SIZE, MODE>(
        spi: SPI,
        dc: DC,
        cs: CS,
        reset: RESET,
        backlight: BL,
        delay: &mut DELAY,
        mode: MODE,
        display_size: SIZE,
    ) -> Result<Self>
    where
        DELAY: DelayMs<u8>,
        SIZE: DisplaySize,
        MODE: Mode,
    {
        Self::new(
            SPIInterface::new(spi, dc, cs),
            reset,
            backlight,
            delay,
            mode,
            display_size,
        )
    }
}

impl<IFACE, RESET, BL> Ili9488<IFACE, RESET, BL>
where
    IFACE: WriteOnlyDataCommand,
{
    fn command(&mut self, cmd: Command, args: &[u8]) -> Result {
        self.interface.send_commands(U8(&[cmd as u8]))?;
        if !args.is_empty() {
            self.interface.send_data(U8(args))?;
        }
        Ok(())
    }

    fn apply_sequence(&mut self, sequence: &[(Command, &[u8])]) -> Result {
        for &(cmd, args) in sequence {
            self.command(cmd, args)?;
        }
        Ok(())
    }

    /// Select the memory window the next pixel transfer is written to,
    /// represented by top-left corner (x0, y0) and bottom-right corner (x1, y1).
    ///
    /// The border is included. Columns must be set before rows, and both
    /// before the Memory Write command.
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result {
        trace!("ili9488: window ({}, {})..=({}, {})", x0, y0, x1, y1);
        // Addresses are 16 bits on the wire; offsets wrap like the register does.
        let [xs_hi, xs_lo] = x0.wrapping_add(self.offset_x).to_be_bytes();
        let [xe_hi, xe_lo] = x1.wrapping_add(self.offset_x).to_be_bytes();
        self.command(Command::ColumnAddressSet, &[xs_hi, xs_lo, xe_hi, xe_lo])?;

        let [ys_hi, ys_lo] = y0.wrapping_add(self.offset_y).to_be_bytes();
        let [ye_hi, ye_lo] = y1.wrapping_add(self.offset_y).to_be_bytes();
        self.command(Command::PageAddressSet, &[ys_hi, ys_lo, ye_hi, ye_lo])?;

        self.command(Command::MemoryWrite, &[])
    }

    /// Draw a rectangle on the screen, represented by top-left corner (x0, y0)
    /// and bottom-right corner (x1, y1).
    ///
    /// The border is included.
    ///
    /// This method accepts an iterator of raw R, G, B bytes. It is useful to
    /// avoid holding a buffer for the whole window when it is not necessary.
    pub fn draw_raw_iter<I: IntoIterator<Item = u8>>(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        data: I,
    ) -> Result {
        self.set_window(x0, y0, x1, y1)?;
        self.interface
            .send_data(U8Iter(&mut data.into_iter()))
            .map_err(Error::from)
    }

    /// Copy a raw R, G, B buffer into the window (x0, y0)..=(x1, y1) in one transfer.
    ///
    /// `buffer` must hold exactly `(x1 - x0 + 1) * (y1 - y0 + 1) * 3` bytes, otherwise the
    /// controller's write pointer ends up out of step with the next window.
    pub fn flush_bit_buffer(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, buffer: &[u8]) -> Result {
        self.set_window(x0, y0, x1, y1)?;
        self.interface.send_data(U8(buffer)).map_err(Error::from)
    }

    /// Rotate the screen by `selector` quarter turns (taken modulo 4)
    pub fn set_direction(&mut self, selector: u8) -> Result {
        self.set_orientation(Orientation::from(selector))
    }

    /// Change the orientation of the screen
    pub fn set_orientation<MODE>(&mut self, mode: MODE) -> Result
    where
        MODE: Mode,
    {
        self.command(Command::MemoryAccessControl, &[mode.mode()])?;

        if mode.is_landscape() {
            self.width = self.native_height;
            self.height = self.native_width;
        } else {
            self.width = self.native_width;
            self.height = self.native_height;
        }
        debug!(
            "ili9488: madctl {:#04x}, screen is now {}x{}",
            mode.mode(),
            self.width,
            self.height
        );
        Ok(())
    }

    /// Fill entire screen with the specified color
    pub fn clear_screen(&mut self, r: u8, g: u8, b: u8) -> Result {
        let pixels = self.width * self.height;
        let (x1, y1) = self.bottom_right();
        self.draw_raw_iter(
            0,
            0,
            x1,
            y1,
            core::iter::repeat([r, g, b]).take(pixels).flatten(),
        )
    }

    /// Control the screen sleep mode:
    pub fn sleep_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.command(Command::SleepModeOn, &[]),
            ModeState::Off => self.command(Command::SleepModeOff, &[]),
        }
    }

    /// Control the screen display mode
    pub fn display_mode(&mut self, mode: ModeState) -> Result {
        match mode {
            ModeState::On => self.command(Command::DisplayOn, &[]),
            ModeState::Off => self.command(Command::DisplayOff, &[]),
        }
    }

}

impl<IFACE, RESET, BL> Ili9488<IFACE, RESET, BL> {
    /// Get the current screen width. It can change based on the current orientation
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the current screen height. It can change based on the current orientation
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current `(width, height)`
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Address offset `(x, y)` added to every window
    pub fn offset(&self) -> (u16, u16) {
        (self.offset_x, self.offset_y)
    }

    /// A canvas covering the whole screen in the current orientation
    pub fn full_screen_canvas(&self) -> Canvas {
        let (x1, y1) = self.bottom_right();
        Canvas::new(0, 0, x1, y1)
    }

    /// A canvas bound to the inclusive rectangle (x0, y0)..=(x1, y1)
    pub fn canvas(&self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<Canvas> {
        if !self.fits(x0, y0, x1, y1) {
            return Err(Error::OutOfBounds);
        }
        Ok(Canvas::new(x0, y0, x1, y1))
    }

    /// Release the interface and pins
    pub fn release(self) -> (IFACE, RESET, BL) {
        (self.interface, self.reset, self.backlight)
    }

    pub(crate) fn fits(&self, x0: u16, y0: u16, x1: u16, y1: u16) -> bool {
        x0 <= x1 && y0 <= y1 && (x1 as usize) < self.width && (y1 as usize) < self.height
    }

    fn bottom_right(&self) -> (u16, u16) {
        ((self.width - 1) as u16, (self.height - 1) as u16)
    }
}

#[derive(Clone, Copy)]
enum Command {
    SleepModeOn = 0x10,
    SleepModeOff = 0x11,
    DisplayOff = 0x28,
    DisplayOn = 0x29,
    ColumnAddressSet = 0x2a,
    PageAddressSet = 0x2b,
    MemoryWrite = 0x2c,
    MemoryAccessControl = 0x36,
    PixelFormatSet = 0x3a,
    NormalModeFrameRate = 0xb1,
    DisplayInversionControl = 0xb4,
    DisplayFunctionControl = 0xb6,
    EntryModeSet = 0xb7,
    HSLanesControl = 0xbe,
    PowerControl1 = 0xc0,
    PowerControl2 = 0xc1,
    VCOMControl1 = 0xc5,
    PositiveGammaControl = 0xe0,
    NegativeGammaControl = 0xe1,
    SetImageFunction = 0xe9,
    AdjustControl3 = 0xf7,
}
