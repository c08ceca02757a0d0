use crate::color::{BLACK, Rgb};
use crate::error::Result;
use crate::frame::FrameBuffer;
use crate::gamma::GammaTable;
use crate::rate::RateLimiter;
use crate::sink::{DeviceSink, Frame, UdpStrip};

#[derive(Debug)]
struct SinkSlot {
    sink: DeviceSink,
    limiter: RateLimiter,
    enabled: bool,
}

/// Sink status for external observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkStatus {
    pub name: &'static str,
    pub divisor: u32,
    pub enabled: bool,
}

/// Output pipeline - the main orchestrator
///
/// Owns the frame buffer, the gamma table and every sink. One call to
/// [`Renderer::update`] per render tick pushes the current frame to all
/// sinks whose rate limiter lets the tick through.
#[derive(Debug)]
pub struct Renderer {
    // Configuration
    gamma: Option<GammaTable>,

    // Internal state
    frame: FrameBuffer,
    quantized: Vec<Rgb>,
    corrected: Vec<Rgb>,
    shut_down: bool,

    // Outputs
    sinks: Vec<SinkSlot>,
}

impl Renderer {
    /// Create a renderer for a strip of `len` pixels
    ///
    /// Passing `None` as gamma disables correction.
    pub fn new(len: usize, gamma: Option<GammaTable>) -> Self {
        Self {
            gamma,
            frame: FrameBuffer::new(len),
            quantized: vec![BLACK; len],
            corrected: vec![BLACK; len],
            shut_down: false,
            sinks: Vec::new(),
        }
    }

    /// Attach an output
    ///
    /// Network strips are checked against the protocol's index limit.
    pub fn add_sink(&mut self, sink: DeviceSink) -> Result<()> {
        if matches!(sink, DeviceSink::UdpStrip(_)) {
            crate::diff::check_strip_len(self.frame.len())?;
        }
        tracing::debug!(
            "Attached {} at 1/{} of the render rate",
            sink.name(),
            sink.divisor()
        );
        self.sinks.push(SinkSlot {
            limiter: RateLimiter::new(sink.divisor()),
            sink,
            enabled: true,
        });
        Ok(())
    }

    /// Attach a network strip
    pub fn with_udp_strip(mut self, strip: UdpStrip) -> Result<Self> {
        self.add_sink(DeviceSink::UdpStrip(strip))?;
        Ok(self)
    }

    pub const fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Frame buffer for the producer to write into
    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    pub const fn gamma_correction(&self) -> bool {
        self.gamma.is_some()
    }

    /// Output of the last quantize and gamma step
    pub fn corrected(&self) -> &[Rgb] {
        &self.corrected
    }

    pub fn sinks(&self) -> impl Iterator<Item = SinkStatus> + '_ {
        self.sinks.iter().map(|slot| SinkStatus {
            name: slot.sink.name(),
            divisor: slot.limiter.divisor(),
            enabled: slot.enabled,
        })
    }

    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Push the current frame to the sinks
    ///
    /// Quantization and gamma correction run once per call. Sink errors are
    /// logged and never reach the caller or the other sinks; an unreachable
    /// sink is disabled for good.
    pub fn update(&mut self) {
        if self.shut_down {
            return;
        }

        self.frame.quantize_into(&mut self.quantized);
        self.corrected.copy_from_slice(&self.quantized);
        if let Some(gamma) = &self.gamma {
            gamma.apply(&mut self.corrected);
        }

        let frame = Frame {
            corrected: &self.corrected,
            quantized: &self.quantized,
            previous: self.frame.previous(),
        };

        let mut delivered = true;
        for slot in self.sinks.iter_mut().filter(|slot| slot.enabled) {
            if !slot.limiter.tick() {
                continue;
            }
            let Err(err) = slot.sink.send(&frame) else {
                continue;
            };
            if slot.sink.tracks_diff() {
                delivered = false;
            }
            if err.disables_sink() {
                tracing::error!("Disabling {}: {}", slot.sink.name(), err);
                slot.enabled = false;
            } else {
                tracing::warn!("{} dropped a frame: {}", slot.sink.name(), err);
            }
        }

        if delivered {
            self.frame.commit(&self.corrected);
        }
    }

    /// Turn every output off
    ///
    /// Only the first call sends anything; `update` does nothing afterwards.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for slot in self.sinks.iter_mut().filter(|slot| slot.enabled) {
            if let Err(err) = slot.sink.all_off() {
                tracing::warn!("Failed to turn off {}: {}", slot.sink.name(), err);
            }
        }
        self.frame.invalidate();
        tracing::info!("Output pipeline shut down");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
