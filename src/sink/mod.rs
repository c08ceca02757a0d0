//! Output targets
//!
//! Every sink is a variant of [`DeviceSink`] so dispatch is a plain match
//! and the set of outputs is fixed once at startup. Each variant implements
//! [`Sink`].

mod bulb;
mod direct;
mod grid;
mod udp;
mod usb;

pub use bulb::{
    ACK_MESSAGE, BulbCommand, BulbTransport, DEFAULT_BULB_PORT, DEFAULT_KELVIN, HEADER_LEN,
    LanBulb, SET_COLOR_LEN, SET_COLOR_MESSAGE, SmartBulbGroup, encode_set_color,
};
pub use direct::{DirectStrip, StripDriver, pack_grb};
pub use grid::{GridDriver, LightingGrid};
pub use udp::{Datagram, UdpStrip};
pub use usb::{UsbDriver, UsbStrip};

use crate::color::Rgb;
use crate::error::Result;

/// One frame as seen by the sinks
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Quantized and gamma corrected pixels
    pub corrected: &'a [Rgb],
    /// Quantized pixels without gamma correction
    pub quantized: &'a [Rgb],
    /// Last corrected frame accepted by the diff-tracking sinks
    pub previous: &'a [Option<Rgb>],
}

pub trait Sink {
    /// The sink runs on one of every `DIVISOR` ticks
    const DIVISOR: u32 = 1;

    /// Sink sends only what changed since `Frame::previous`
    ///
    /// A failure of such a sink keeps `previous` where it was, so the
    /// next frame carries the same changes again.
    const TRACKS_DIFF: bool = false;

    /// Encode and send one frame
    fn send(&mut self, frame: &Frame<'_>) -> Result<()>;

    /// Turn every light off
    fn all_off(&mut self) -> Result<()>;
}

/// Sink slot - enum containing all supported outputs
pub enum DeviceSink {
    /// LED strip behind a network controller
    UdpStrip(UdpStrip),
    /// LED strip wired to the host
    DirectStrip(DirectStrip),
    /// LED strip behind a USB controller
    UsbStrip(UsbStrip),
    /// Per-key peripherals
    LightingGrid(LightingGrid),
    /// Smart bulbs following the strip midpoint
    SmartBulbGroup(SmartBulbGroup),
}

impl DeviceSink {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UdpStrip(_) => "udp_strip",
            Self::DirectStrip(_) => "direct_strip",
            Self::UsbStrip(_) => "usb_strip",
            Self::LightingGrid(_) => "lighting_grid",
            Self::SmartBulbGroup(_) => "smart_bulbs",
        }
    }

    /// Frame divisor of the sink
    ///
    /// Derived from each sink's `Sink::DIVISOR` constant.
    pub const fn divisor(&self) -> u32 {
        match self {
            Self::UdpStrip(_) => UdpStrip::DIVISOR,
            Self::DirectStrip(_) => DirectStrip::DIVISOR,
            Self::UsbStrip(_) => UsbStrip::DIVISOR,
            Self::LightingGrid(_) => LightingGrid::DIVISOR,
            Self::SmartBulbGroup(_) => SmartBulbGroup::DIVISOR,
        }
    }

    /// Returns if the sink sends changes only
    pub const fn tracks_diff(&self) -> bool {
        match self {
            Self::UdpStrip(_) => UdpStrip::TRACKS_DIFF,
            Self::DirectStrip(_) => DirectStrip::TRACKS_DIFF,
            Self::UsbStrip(_) => UsbStrip::TRACKS_DIFF,
            Self::LightingGrid(_) => LightingGrid::TRACKS_DIFF,
            Self::SmartBulbGroup(_) => SmartBulbGroup::TRACKS_DIFF,
        }
    }

    pub fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        match self {
            Self::UdpStrip(sink) => sink.send(frame),
            Self::DirectStrip(sink) => sink.send(frame),
            Self::UsbStrip(sink) => sink.send(frame),
            Self::LightingGrid(sink) => sink.send(frame),
            Self::SmartBulbGroup(sink) => sink.send(frame),
        }
    }

    pub fn all_off(&mut self) -> Result<()> {
        match self {
            Self::UdpStrip(sink) => sink.all_off(),
            Self::DirectStrip(sink) => sink.all_off(),
            Self::UsbStrip(sink) => sink.all_off(),
            Self::LightingGrid(sink) => sink.all_off(),
            Self::SmartBulbGroup(sink) => sink.all_off(),
        }
    }
}

impl core::fmt::Debug for DeviceSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("DeviceSink").field(&self.name()).finish()
    }
}
