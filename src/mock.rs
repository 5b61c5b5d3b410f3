//! Recording doubles for the bus, pins and delay.

use core::convert::Infallible;
use std::{cell::RefCell, rc::Rc};

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_hal::blocking::{delay::DelayMs, spi};
use embedded_hal::digital::v2::OutputPin;

use crate::{DisplaySize320x480, Ili9488, Orientation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinKind {
    Reset,
    Backlight,
    Dc,
    Cs,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Command(Vec<u8>),
    Data(Vec<u8>),
    Pin(PinKind, bool),
    DelayMs(u8),
    SpiWrite(Vec<u8>),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Drains everything recorded so far.
pub fn take(log: &Log) -> Vec<Event> {
    log.borrow_mut().drain(..).collect()
}

pub type MockDisplay = Ili9488<MockInterface, MockPin, MockPin>;

/// A powered-up portrait display with an empty log.
pub fn display() -> (MockDisplay, Log) {
    let log = log();
    let lcd = Ili9488::new(
        MockInterface::new(&log),
        MockPin::new(&log, PinKind::Reset),
        MockPin::new(&log, PinKind::Backlight),
        &mut MockDelay::new(&log),
        Orientation::Portrait,
        DisplaySize320x480,
    )
    .unwrap();
    take(&log);
    (lcd, log)
}

/// Folds raw pin/bus events into one `(dc_high, bytes)` entry per chip-select group.
pub fn spi_frames(events: &[Event]) -> Vec<(bool, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut dc = false;
    let mut current: Option<(bool, Vec<u8>)> = None;

    for event in events {
        match event {
            Event::Pin(PinKind::Dc, level) => dc = *level,
            Event::Pin(PinKind::Cs, false) => current = Some((dc, Vec::new())),
            Event::Pin(PinKind::Cs, true) => {
                if let Some(frame) = current.take() {
                    frames.push(frame);
                }
            }
            Event::SpiWrite(bytes) => {
                let frame = current.as_mut().expect("bus write outside chip select");
                frame.0 = dc;
                frame.1.extend_from_slice(bytes);
            }
            _ => {}
        }
    }
    frames
}

pub struct MockInterface {
    log: Log,
}

impl MockInterface {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

fn collect(buf: DataFormat<'_>) -> Result<Vec<u8>, DisplayError> {
    match buf {
        DataFormat::U8(bytes) => Ok(bytes.to_vec()),
        DataFormat::U8Iter(iter) => Ok(iter.collect()),
        _ => Err(DisplayError::DataFormatNotImplemented),
    }
}

impl WriteOnlyDataCommand for MockInterface {
    fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), DisplayError> {
        let bytes = collect(cmd)?;
        self.log.borrow_mut().push(Event::Command(bytes));
        Ok(())
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        let bytes = collect(buf)?;
        self.log.borrow_mut().push(Event::Data(bytes));
        Ok(())
    }
}

pub struct MockPin {
    log: Log,
    kind: PinKind,
}

impl MockPin {
    pub fn new(log: &Log, kind: PinKind) -> Self {
        Self {
            log: log.clone(),
            kind,
        }
    }
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Pin(self.kind, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Pin(self.kind, true));
        Ok(())
    }
}

pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayMs<u8> for MockDelay {
    fn delay_ms(&mut self, ms: u8) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub struct MockSpi {
    log: Log,
}

impl MockSpi {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl spi::Write<u8> for MockSpi {
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::SpiWrite(words.to_vec()));
        Ok(())
    }
}
