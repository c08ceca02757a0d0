//! Strip to lighting-grid mapping
//!
//! Per-key peripherals are small 2-D grids. A [`DeviceLayout`] says which
//! samples of the strip land on which cells; the [`GridMapper`] produces
//! those samples in one of two ways:
//!
//! - [`LayoutMode::Scaled`]: the whole strip is block-averaged down to the
//!   layout's sample count, so every device shows the same span.
//! - [`LayoutMode::FullResolution`]: each device gets its own run of raw
//!   pixels. The runs sit side by side, centered on the strip midpoint.
//!
//! Layouts marked as `trail` keep a scrolling history: row 0 always holds
//! the newest samples and older rows move down by one on every frame.

use serde::Deserialize;

use crate::color::{BLACK, Rgb, block_average};
use crate::error::{Error, Result};

/// Peripheral families with a lighting grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridDeviceKind {
    Keyboard,
    Keypad,
    Mouse,
    Mousepad,
    Headset,
}

impl GridDeviceKind {
    /// Native grid size as `(rows, columns)`
    pub const fn dimensions(self) -> (usize, usize) {
        match self {
            Self::Keyboard => (6, 22),
            Self::Keypad => (4, 5),
            Self::Mouse => (9, 7),
            Self::Mousepad => (1, 15),
            Self::Headset => (1, 1),
        }
    }

    /// Devices that only take one color for the whole device
    pub const fn is_static(self) -> bool {
        matches!(self, Self::Headset)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Keypad => "keypad",
            Self::Mouse => "mouse",
            Self::Mousepad => "mousepad",
            Self::Headset => "headset",
        }
    }
}

/// Resampling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Scaled,
    FullResolution,
}

/// Placement of one sample on the device grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Cell {
    /// Index into the layout window
    pub sample: usize,
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(sample: usize, x: usize, y: usize) -> Self {
        Self { sample, x, y }
    }
}

/// Geometry of one device
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceLayout {
    pub device: GridDeviceKind,
    /// Number of blocks the strip is averaged into in scaled mode
    pub samples: usize,
    /// Average the strip into this many blocks first and resample those
    #[serde(default)]
    pub presample: Option<usize>,
    /// First block shown on the device in scaled mode
    #[serde(default)]
    pub first_sample: usize,
    /// Samples shown on the device, also its pixel count in full resolution
    pub width: usize,
    /// Scroll older rows down on every frame
    #[serde(default)]
    pub trail: bool,
    pub cells: Vec<Cell>,
}

impl DeviceLayout {
    /// Check that the layout fits its device
    pub fn validate(&self) -> Result<()> {
        let name = self.device.as_str();
        if self.width == 0 {
            return Err(Error::Configuration(format!("{name} layout has zero width")));
        }
        if self.first_sample + self.width > self.samples {
            return Err(Error::Configuration(format!(
                "{name} layout window {}..{} exceeds {} samples",
                self.first_sample,
                self.first_sample + self.width,
                self.samples
            )));
        }
        if self.presample == Some(0) {
            return Err(Error::Configuration(format!("{name} layout has zero presample")));
        }
        let (rows, cols) = self.device.dimensions();
        for cell in &self.cells {
            if cell.sample >= self.width || cell.x >= cols || cell.y >= rows {
                return Err(Error::Configuration(format!(
                    "{name} layout cell {cell:?} is outside the {rows}x{cols} grid or {} samples",
                    self.width
                )));
            }
        }
        Ok(())
    }
}

/// Hand-tuned layouts for the supported peripheral set
pub fn default_layouts() -> Vec<DeviceLayout> {
    let mut mouse = Vec::with_capacity(16);
    // Left edge runs upward, right edge runs back down, logo gets the middle
    for i in 0..7 {
        mouse.push(Cell::new(i, 0, i + 1));
    }
    for i in 7..15 {
        mouse.push(Cell::new(i, 6, 15 - i));
    }
    mouse.push(Cell::new(7, 3, 2));

    vec![
        DeviceLayout {
            device: GridDeviceKind::Mousepad,
            samples: 15,
            presample: None,
            first_sample: 0,
            width: 15,
            trail: false,
            cells: (0..15).map(|i| Cell::new(i, i, 0)).collect(),
        },
        DeviceLayout {
            device: GridDeviceKind::Mouse,
            samples: 15,
            presample: None,
            first_sample: 0,
            width: 15,
            trail: false,
            cells: mouse,
        },
        DeviceLayout {
            device: GridDeviceKind::Headset,
            samples: 15,
            presample: None,
            first_sample: 7,
            width: 1,
            trail: false,
            cells: vec![Cell::new(0, 0, 0)],
        },
        DeviceLayout {
            device: GridDeviceKind::Keyboard,
            samples: 20,
            presample: None,
            first_sample: 2,
            width: 16,
            trail: true,
            cells: (0..16).map(|i| Cell::new(i, i, 0)).collect(),
        },
        DeviceLayout {
            device: GridDeviceKind::Keypad,
            samples: 5,
            presample: Some(20),
            first_sample: 0,
            width: 5,
            trail: true,
            cells: (0..5).map(|i| Cell::new(i, i, 0)).collect(),
        },
    ]
}

/// Fixed-depth grid with a rotating row offset
///
/// All rows live in one arena. Row 0 is the newest, scrolling only moves
/// the head offset and clears the recycled row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryGrid {
    rows: usize,
    cols: usize,
    head: usize,
    cells: Vec<Rgb>,
}

impl HistoryGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            head: 0,
            cells: vec![BLACK; rows * cols],
        }
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Row `y`, counted from the newest
    pub fn row(&self, y: usize) -> &[Rgb] {
        let start = self.offset(y);
        &self.cells[start..start + self.cols]
    }

    /// Rows from newest to oldest
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Rgb]> + '_ {
        (0..self.rows).map(|y| self.row(y))
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.row(y)[x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        let start = self.offset(y);
        self.cells[start + x] = color;
    }

    /// Scroll by one row: the oldest row is recycled as a blank newest row
    pub fn advance(&mut self) {
        if self.rows == 0 {
            return;
        }
        self.head = (self.head + self.rows - 1) % self.rows;
        let start = self.head * self.cols;
        self.cells[start..start + self.cols].fill(BLACK);
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLACK);
        self.head = 0;
    }

    fn offset(&self, y: usize) -> usize {
        ((self.head + y) % self.rows) * self.cols
    }
}

#[derive(Debug, Clone)]
struct MappedDevice {
    layout: DeviceLayout,
    /// First strip index in full-resolution mode
    span_start: usize,
    blocks: Vec<Rgb>,
    /// First averaging stage of a two-stage layout
    stage: Vec<Rgb>,
    grid: HistoryGrid,
}

/// Renders strip frames onto a set of device grids
#[derive(Debug, Clone)]
pub struct GridMapper {
    mode: LayoutMode,
    devices: Vec<MappedDevice>,
}

impl GridMapper {
    /// Build a mapper for a strip of `strip_len` pixels
    pub fn new(mode: LayoutMode, layouts: Vec<DeviceLayout>, strip_len: usize) -> Result<Self> {
        for layout in &layouts {
            layout.validate()?;
        }

        let total: usize = layouts.iter().map(|layout| layout.width).sum();
        if mode == LayoutMode::FullResolution && total > strip_len {
            return Err(Error::Configuration(format!(
                "full resolution layouts need {total} pixels, strip has {strip_len}"
            )));
        }

        let mut span_start = (strip_len / 2).saturating_sub(total / 2);
        let devices = layouts
            .into_iter()
            .map(|layout| {
                let (rows, cols) = layout.device.dimensions();
                let device = MappedDevice {
                    span_start,
                    blocks: vec![BLACK; layout.samples],
                    stage: vec![BLACK; layout.presample.unwrap_or(0)],
                    grid: HistoryGrid::new(rows, cols),
                    layout,
                };
                span_start += device.layout.width;
                device
            })
            .collect();

        Ok(Self { mode, devices })
    }

    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Write the newest samples of `pixels` into every device grid
    pub fn render(&mut self, pixels: &[Rgb]) {
        for device in &mut self.devices {
            let layout = &device.layout;
            let window = match self.mode {
                LayoutMode::Scaled => {
                    if device.stage.is_empty() {
                        block_average(pixels, &mut device.blocks);
                    } else {
                        block_average(pixels, &mut device.stage);
                        block_average(&device.stage, &mut device.blocks);
                    }
                    &device.blocks[layout.first_sample..layout.first_sample + layout.width]
                }
                LayoutMode::FullResolution => {
                    let end = (device.span_start + layout.width).min(pixels.len());
                    let start = device.span_start.min(end);
                    &pixels[start..end]
                }
            };

            for cell in &layout.cells {
                let color = window.get(cell.sample).copied().unwrap_or(BLACK);
                device.grid.set(cell.x, cell.y, color);
            }
        }
    }

    /// Scroll every trail device by one row
    pub fn advance(&mut self) {
        for device in &mut self.devices {
            if device.layout.trail {
                device.grid.advance();
            }
        }
    }

    /// Blank every device grid
    pub fn clear(&mut self) {
        for device in &mut self.devices {
            device.grid.clear();
        }
    }

    /// Current grid of each device in layout order
    pub fn devices(&self) -> impl Iterator<Item = (GridDeviceKind, &HistoryGrid)> + '_ {
        self.devices
            .iter()
            .map(|device| (device.layout.device, &device.grid))
    }

    /// Strip range shown by `device` in full-resolution mode
    pub fn span_of(&self, device: GridDeviceKind) -> Option<core::ops::Range<usize>> {
        self.devices
            .iter()
            .find(|mapped| mapped.layout.device == device)
            .map(|mapped| mapped.span_start..mapped.span_start + mapped.layout.width)
    }
}
