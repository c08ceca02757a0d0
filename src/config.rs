//! Pipeline configuration
//!
//! ```toml
//! pixel_count = 60
//! device = "udp"
//! gamma_correction = true
//! gamma_table = { exponent = 2.2 }
//!
//! [udp]
//! address = "192.168.0.150:7777"
//! mirror = "192.168.0.151:7777"
//!
//! [grid]
//! enabled = true
//! mode = "full_resolution"
//!
//! [bulbs]
//! enabled = true
//! addresses = ["192.168.0.20:56700"]
//! kelvin = 3500
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::diff::check_strip_len;
use crate::error::{Error, Result};
use crate::gamma::GammaTable;
use crate::grid::{DeviceLayout, GridMapper, LayoutMode, default_layouts};
use crate::renderer::Renderer;
use crate::sink::{
    DEFAULT_KELVIN, DeviceSink, DirectStrip, GridDriver, LightingGrid, SmartBulbGroup,
    StripDriver, UdpStrip, UsbDriver, UsbStrip,
};

const DEVICE_NAME_UDP: &str = "udp";
const DEVICE_NAME_DIRECT: &str = "direct";
const DEVICE_NAME_USB: &str = "usb";

/// Strip sink selected by the `device` option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Network controller reached over UDP
    Udp,
    /// Strip wired to the host
    Direct,
    /// USB strip controller
    Usb,
}

impl DeviceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Udp => DEVICE_NAME_UDP,
            Self::Direct => DEVICE_NAME_DIRECT,
            Self::Usb => DEVICE_NAME_USB,
        }
    }
}

impl FromStr for DeviceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            DEVICE_NAME_UDP => Ok(Self::Udp),
            DEVICE_NAME_DIRECT => Ok(Self::Direct),
            DEVICE_NAME_USB => Ok(Self::Usb),
            other => Err(Error::UnknownDevice(other.to_owned())),
        }
    }
}

/// Where the gamma table comes from
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GammaSource {
    /// Built-in WS281x curve
    #[default]
    Builtin,
    /// Power-law curve with the given exponent
    Exponent(f32),
    /// Text table on disk
    Path(PathBuf),
}

impl GammaSource {
    pub fn load(&self) -> Result<GammaTable> {
        match self {
            Self::Builtin => Ok(GammaTable::builtin()),
            Self::Exponent(gamma) => GammaTable::from_exponent(*gamma),
            Self::Path(path) => GammaTable::load(path),
        }
    }
}

/// Network strip options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    /// Primary controller
    pub address: SocketAddr,
    /// Secondary strip receiving the same packets
    pub mirror: Option<SocketAddr>,
    /// Upper bound for one blocking send
    pub timeout_ms: u64,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([192, 168, 0, 150], 7777)),
            mirror: None,
            timeout_ms: 20,
        }
    }
}

/// Lighting-grid options
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    pub mode: LayoutMode,
    /// Replaces the built-in device layouts
    pub layouts: Option<Vec<DeviceLayout>>,
}

impl GridConfig {
    pub fn layouts(&self) -> Vec<DeviceLayout> {
        self.layouts.clone().unwrap_or_else(default_layouts)
    }
}

/// Smart bulb options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BulbConfig {
    pub enabled: bool,
    pub addresses: Vec<SocketAddr>,
    /// Color temperature sent with every command
    pub kelvin: u16,
    /// Time a bulb gets to acknowledge its first command
    pub timeout_ms: u64,
}

impl Default for BulbConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addresses: Vec::new(),
            kelvin: DEFAULT_KELVIN,
            timeout_ms: 500,
        }
    }
}

/// Configuration of the whole output pipeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of pixels in the strip
    pub pixel_count: usize,
    /// Strip sink: `udp`, `direct` or `usb`
    pub device: String,
    pub gamma_correction: bool,
    pub gamma_table: GammaSource,
    pub udp: UdpConfig,
    pub grid: GridConfig,
    pub bulbs: BulbConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pixel_count: 60,
            device: DEVICE_NAME_UDP.to_owned(),
            gamma_correction: true,
            gamma_table: GammaSource::Builtin,
            udp: UdpConfig::default(),
            grid: GridConfig::default(),
            bulbs: BulbConfig::default(),
        }
    }
}

/// Hardware handles for the sinks that have no network transport
#[derive(Default)]
pub struct HardwareDrivers {
    pub strip: Option<Box<dyn StripDriver>>,
    pub usb: Option<Box<dyn UsbDriver>>,
    pub grid: Option<Box<dyn GridDriver>>,
}

impl OutputConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn device_kind(&self) -> Result<DeviceKind> {
        self.device.parse()
    }

    /// Check every option that can be checked without touching hardware
    pub fn validate(&self) -> Result<()> {
        if self.pixel_count == 0 {
            return Err(Error::Configuration("pixel_count must be positive".into()));
        }
        if self.device_kind()? == DeviceKind::Udp {
            check_strip_len(self.pixel_count)?;
        }
        if self.grid.enabled {
            GridMapper::new(self.grid.mode, self.grid.layouts(), self.pixel_count)?;
        }
        if self.bulbs.enabled && self.bulbs.addresses.is_empty() {
            return Err(Error::Configuration(
                "bulbs are enabled but no addresses are configured".into(),
            ));
        }
        Ok(())
    }

    /// Gamma table to apply, `None` when correction is off
    pub fn gamma(&self) -> Result<Option<GammaTable>> {
        if !self.gamma_correction {
            return Ok(None);
        }
        self.gamma_table.load().map(Some)
    }

    /// Create the renderer and every enabled sink
    ///
    /// Bulbs that can not be set up are logged and left out; everything
    /// else is fatal.
    pub fn build(&self, drivers: HardwareDrivers) -> Result<Renderer> {
        self.validate()?;
        let len = self.pixel_count;
        let mut renderer = Renderer::new(len, self.gamma()?);

        let strip = match self.device_kind()? {
            DeviceKind::Udp => DeviceSink::UdpStrip(UdpStrip::bind(
                len,
                self.udp.address,
                self.udp.mirror,
                Duration::from_millis(self.udp.timeout_ms),
            )?),
            DeviceKind::Direct => {
                let driver = drivers
                    .strip
                    .ok_or_else(|| missing_driver(DeviceKind::Direct.as_str()))?;
                DeviceSink::DirectStrip(DirectStrip::new(driver, len))
            }
            DeviceKind::Usb => {
                let driver = drivers
                    .usb
                    .ok_or_else(|| missing_driver(DeviceKind::Usb.as_str()))?;
                DeviceSink::UsbStrip(UsbStrip::new(driver, 0, len))
            }
        };
        renderer.add_sink(strip)?;

        if self.grid.enabled {
            let driver = drivers.grid.ok_or_else(|| missing_driver("grid"))?;
            let mapper = GridMapper::new(self.grid.mode, self.grid.layouts(), len)?;
            renderer.add_sink(DeviceSink::LightingGrid(LightingGrid::new(driver, mapper)))?;
        }

        if self.bulbs.enabled {
            match SmartBulbGroup::connect(
                &self.bulbs.addresses,
                self.bulbs.kelvin,
                Duration::from_millis(self.bulbs.timeout_ms),
            ) {
                Ok(group) => renderer.add_sink(DeviceSink::SmartBulbGroup(group))?,
                Err(err) => tracing::error!("Smart bulbs disabled: {}", err),
            }
        }

        Ok(renderer)
    }
}

fn missing_driver(output: &str) -> Error {
    Error::Configuration(format!("{output} output is enabled but no driver was supplied"))
}
