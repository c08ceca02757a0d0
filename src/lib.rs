//! Frame output pipeline for LED strips and lighting peripherals
//!
//! A producer writes floating-point intensities into the [`FrameBuffer`];
//! every [`Renderer::update`] quantizes them, applies gamma correction and
//! hands the frame to each attached [`DeviceSink`] at that sink's own rate.

pub mod color;
pub mod config;
pub mod diff;
pub mod error;
pub mod frame;
pub mod frame_scheduler;
pub mod gamma;
pub mod grid;
pub mod rate;
pub mod renderer;
pub mod sink;
pub mod strand;

pub use config::{DeviceKind, GammaSource, HardwareDrivers, OutputConfig};
pub use diff::{DiffEncoder, MAX_PIXELS, MAX_RECORDS_PER_PACKET, Packet, Record};
pub use error::{Error, Result};
pub use frame::{FrameBuffer, RawPixel, quantize};
pub use frame_scheduler::{FrameResult, FrameScheduler};
pub use gamma::GammaTable;
pub use grid::{DeviceLayout, GridDeviceKind, GridMapper, HistoryGrid, LayoutMode};
pub use rate::RateLimiter;
pub use renderer::{Renderer, SinkStatus};
pub use sink::{DeviceSink, Frame, Sink};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};
