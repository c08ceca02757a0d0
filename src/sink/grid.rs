use std::io;

use super::{Frame, Sink};
use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::grid::{GridDeviceKind, GridMapper, HistoryGrid};

/// Vendor SDK access for per-key peripherals
pub trait GridDriver {
    /// Show a full grid on `device`
    fn apply_grid(&mut self, device: GridDeviceKind, grid: &HistoryGrid) -> io::Result<()>;

    /// Show one color on the whole device
    fn set_static(&mut self, device: GridDeviceKind, color: Rgb) -> io::Result<()>;

    /// Turn the device lights off
    fn clear(&mut self, device: GridDeviceKind) -> io::Result<()>;
}

/// Per-key peripherals following the strip
///
/// Runs on every other tick so the vendor SDK is not flooded with
/// commands.
pub struct LightingGrid {
    driver: Box<dyn GridDriver>,
    mapper: GridMapper,
}

impl LightingGrid {
    pub fn new(driver: Box<dyn GridDriver>, mapper: GridMapper) -> Self {
        tracing::info!("Lighting grid in {:?} mode", mapper.mode());
        Self { driver, mapper }
    }

    pub const fn mapper(&self) -> &GridMapper {
        &self.mapper
    }
}

impl Sink for LightingGrid {
    const DIVISOR: u32 = 2;

    fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.mapper.render(frame.quantized);
        for (device, grid) in self.mapper.devices() {
            let sent = if device.is_static() {
                self.driver.set_static(device, grid.get(0, 0))
            } else {
                self.driver.apply_grid(device, grid)
            };
            sent.map_err(Error::TransientSend)?;
        }
        self.mapper.advance();
        Ok(())
    }

    fn all_off(&mut self) -> Result<()> {
        self.mapper.clear();
        let mut result = Ok(());
        for (device, _) in self.mapper.devices() {
            if let Err(err) = self.driver.clear(device) {
                tracing::warn!("Failed to clear {}: {}", device.as_str(), err);
                result = Err(Error::TransientSend(err));
            }
        }
        result
    }
}
