//! Frame buffer and quantization
//!
//! The producer writes floating-point intensities into `current`; the
//! pipeline owns `previous`, the last frame every diff-tracking sink
//! accepted.

use crate::color::Rgb;

/// Unscaled red, green and blue intensity, expected roughly in `0.0..=255.0`
pub type RawPixel = [f32; 3];

/// Clamp to `0..=255` and truncate toward zero.
///
/// NaN maps to 0.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Quantize a raw frame into `out`
///
/// Both slices must have the same length.
pub fn quantize(raw: &[RawPixel], out: &mut [Rgb]) {
    debug_assert_eq!(raw.len(), out.len());
    for (pixel, [r, g, b]) in out.iter_mut().zip(raw) {
        *pixel = Rgb {
            r: quantize_channel(*r),
            g: quantize_channel(*g),
            b: quantize_channel(*b),
        };
    }
}

/// Current and previously sent pixel arrays of a strip
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    current: Vec<RawPixel>,
    /// `None` marks a pixel that was never sent
    previous: Vec<Option<Rgb>>,
}

impl FrameBuffer {
    /// Create a black frame buffer of `len` pixels
    pub fn new(len: usize) -> Self {
        Self {
            current: vec![[0.0; 3]; len],
            previous: vec![None; len],
        }
    }

    /// Number of pixels in the strip
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn current(&self) -> &[RawPixel] {
        &self.current
    }

    /// Mutable access for the producer
    pub fn current_mut(&mut self) -> &mut [RawPixel] {
        &mut self.current
    }

    /// Set one pixel of the current frame
    ///
    /// Out of bounds indices are ignored.
    pub fn set(&mut self, index: usize, pixel: RawPixel) {
        if let Some(slot) = self.current.get_mut(index) {
            *slot = pixel;
        }
    }

    /// Set every pixel of the current frame
    pub fn fill(&mut self, pixel: RawPixel) {
        self.current.fill(pixel);
    }

    /// Quantize the current frame into `out`
    pub fn quantize_into(&self, out: &mut [Rgb]) {
        quantize(&self.current, out);
    }

    /// Last frame accepted by every diff-tracking sink
    pub fn previous(&self) -> &[Option<Rgb>] {
        &self.previous
    }

    /// Record `sent` as delivered
    pub(crate) fn commit(&mut self, sent: &[Rgb]) {
        for (previous, pixel) in self.previous.iter_mut().zip(sent) {
            *previous = Some(*pixel);
        }
    }

    /// Forget what was sent, so the next frame carries every pixel
    pub fn invalidate(&mut self) {
        self.previous.fill(None);
    }
}
