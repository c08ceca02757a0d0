use std::io;

use super::{Frame, Sink};
use crate::color::Rgb;
use crate::diff::changed_indices;
use crate::error::{Error, Result};

/// Hardware access for a strip wired to the host
///
/// Implement this trait on top of the platform PWM/DMA driver.
pub trait StripDriver {
    /// Stage a packed color, see [`pack_grb`]
    fn set_pixel(&mut self, index: usize, packed: u32);

    /// Latch staged pixels onto the strip
    fn show(&mut self) -> io::Result<()>;
}

/// Pack a color as `0x00GGRRBB`, the word layout WS281x DMA drivers expect
#[inline]
#[allow(clippy::cast_lossless)]
pub const fn pack_grb(color: Rgb) -> u32 {
    ((color.g as u32) << 16) | ((color.r as u32) << 8) | color.b as u32
}

/// Directly-wired LED strip
///
/// Unchanged pixels are not restaged.
pub struct DirectStrip {
    driver: Box<dyn StripDriver>,
    len: usize,
}

impl DirectStrip {
    pub fn new(driver: Box<dyn StripDriver>, len: usize) -> Self {
        tracing::info!("Direct strip of {} pixels", len);
        Self { driver, len }
    }
}

impl Sink for DirectStrip {
    const TRACKS_DIFF: bool = true;

    fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        for index in changed_indices(frame.corrected, frame.previous) {
            self.driver.set_pixel(index, pack_grb(frame.corrected[index]));
        }
        self.driver.show().map_err(Error::TransientSend)
    }

    fn all_off(&mut self) -> Result<()> {
        for index in 0..self.len {
            self.driver.set_pixel(index, 0);
        }
        self.driver.show().map_err(Error::TransientSend)
    }
}
