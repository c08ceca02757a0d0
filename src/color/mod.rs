mod hls;
mod resample;

use smart_leds::RGB8;

pub use hls::{Hls, rgb_to_hls};
pub use resample::{block_average, mean_color};

pub type Rgb = RGB8;

/// All channels off
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
