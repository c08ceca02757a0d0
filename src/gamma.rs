//! Gamma correction lookup table
//!
//! LEDs respond linearly to PWM duty, the eye does not. The table maps a
//! linear 8-bit intensity to the duty that looks proportionally bright.
//! It is built once at startup and only read afterwards.

use std::fs;
use std::path::Path;

use crate::color::Rgb;
use crate::error::{Error, Result};

/// Exponent of the built-in WS281x curve
pub const DEFAULT_GAMMA: f32 = 2.8;

const TABLE_LEN: usize = 256;

/// Color channel selector for per-channel curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// 256-entry (or 256x3) intensity lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable {
    curves: [[u8; TABLE_LEN]; 3],
}

impl GammaTable {
    /// Table that leaves every value unchanged
    pub fn identity() -> Self {
        let mut curve = [0u8; TABLE_LEN];
        for (value, entry) in (0..=u8::MAX).zip(curve.iter_mut()) {
            *entry = value;
        }
        Self::shared(curve)
    }

    /// Built-in curve for WS281x strips
    pub fn builtin() -> Self {
        Self::power_curve(DEFAULT_GAMMA)
    }

    /// Power-law curve `out = 255 * (in / 255) ^ gamma`
    pub fn from_exponent(gamma: f32) -> Result<Self> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(Error::Configuration(format!(
                "gamma exponent must be a positive number, got {gamma}"
            )));
        }
        Ok(Self::power_curve(gamma))
    }

    /// Parse a table from text
    ///
    /// Accepts 256 values (one curve for all channels) or 768 values (red,
    /// green and blue curves in that order) separated by whitespace or
    /// commas. `#` starts a comment that runs to the end of the line.
    pub fn parse(source: &str) -> Result<Self> {
        let mut values = Vec::with_capacity(TABLE_LEN * 3);
        for line in source.lines() {
            let data = line.split('#').next().unwrap_or_default();
            for token in data
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
            {
                let value: i64 = token.parse().map_err(|_| {
                    Error::Configuration(format!("invalid gamma table entry {token:?}"))
                })?;
                values.push(to_channel(value)?);
            }
        }

        match values.len() {
            TABLE_LEN => {
                let mut curve = [0u8; TABLE_LEN];
                curve.copy_from_slice(&values);
                Ok(Self::shared(curve))
            }
            len if len == TABLE_LEN * 3 => {
                let mut curves = [[0u8; TABLE_LEN]; 3];
                for (curve, chunk) in curves.iter_mut().zip(values.chunks_exact(TABLE_LEN)) {
                    curve.copy_from_slice(chunk);
                }
                Ok(Self { curves })
            }
            len => Err(Error::Configuration(format!(
                "gamma table must hold {} or {} entries, found {len}",
                TABLE_LEN,
                TABLE_LEN * 3
            ))),
        }
    }

    /// Load a table from a text file, see [`GammaTable::parse`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let table = Self::parse(&source)?;
        tracing::debug!("Loaded gamma table from {}", path.display());
        Ok(table)
    }

    /// Look up a raw channel value
    ///
    /// Values that are not valid 8-bit intensities are rejected instead of
    /// being wrapped into the table.
    pub fn lookup(&self, channel: Channel, value: i64) -> Result<u8> {
        let index = to_channel(value)?;
        Ok(self.curves[channel.index()][usize::from(index)])
    }

    /// Correct a single pixel
    #[inline]
    pub fn correct(&self, pixel: Rgb) -> Rgb {
        Rgb {
            r: self.curves[0][usize::from(pixel.r)],
            g: self.curves[1][usize::from(pixel.g)],
            b: self.curves[2][usize::from(pixel.b)],
        }
    }

    /// Correct every pixel of a frame in place
    pub fn apply(&self, frame: &mut [Rgb]) {
        for pixel in frame.iter_mut() {
            *pixel = self.correct(*pixel);
        }
    }

    const fn shared(curve: [u8; TABLE_LEN]) -> Self {
        Self {
            curves: [curve, curve, curve],
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn power_curve(gamma: f32) -> Self {
        let mut curve = [0u8; TABLE_LEN];
        for (i, entry) in curve.iter_mut().enumerate() {
            let linear = i as f32 / 255.0;
            *entry = (linear.powf(gamma) * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
        }
        Self::shared(curve)
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_channel(value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OutOfRange { value })
}
