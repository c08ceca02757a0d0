use std::io;

use super::{Frame, Sink};
use crate::error::{Error, Result};

/// Hardware access for a USB strip controller
pub trait UsbDriver {
    /// Replace the LED data of `channel` with GRB triplets
    fn set_led_data(&mut self, channel: u8, data: &[u8]) -> io::Result<()>;
}

/// LED strip behind a USB controller
///
/// The controller takes the whole strip on every frame in GRB order.
pub struct UsbStrip {
    driver: Box<dyn UsbDriver>,
    channel: u8,
    len: usize,
    buffer: Vec<u8>,
}

impl UsbStrip {
    pub fn new(driver: Box<dyn UsbDriver>, channel: u8, len: usize) -> Self {
        tracing::info!("USB strip of {} pixels on channel {}", len, channel);
        Self {
            driver,
            channel,
            len,
            buffer: Vec::with_capacity(len * 3),
        }
    }
}

impl Sink for UsbStrip {
    fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.buffer.clear();
        for pixel in frame.corrected {
            self.buffer.extend_from_slice(&[pixel.g, pixel.r, pixel.b]);
        }
        self.driver
            .set_led_data(self.channel, &self.buffer)
            .map_err(Error::TransientSend)
    }

    fn all_off(&mut self) -> Result<()> {
        self.buffer.clear();
        self.buffer.resize(self.len * 3, 0);
        self.driver
            .set_led_data(self.channel, &self.buffer)
            .map_err(Error::TransientSend)
    }
}
