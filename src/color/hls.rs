use super::Rgb;

/// Hue, lightness and saturation, each normalized to `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub hue: f32,
    pub lightness: f32,
    pub saturation: f32,
}

/// Convert an 8-bit RGB color to HLS.
///
/// Hue is a fraction of the full circle (red at 0.0). Gray colors have
/// zero hue and zero saturation.
pub fn rgb_to_hls(color: Rgb) -> Hls {
    let r = f32::from(color.r) / 255.0;
    let g = f32::from(color.g) / 255.0;
    let b = f32::from(color.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let sum = max + min;
    let range = max - min;
    let lightness = sum / 2.0;

    if range == 0.0 {
        return Hls {
            hue: 0.0,
            lightness,
            saturation: 0.0,
        };
    }

    let saturation = if lightness <= 0.5 {
        range / sum
    } else {
        range / (2.0 - sum)
    };

    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;
    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    Hls {
        hue: (sector / 6.0).rem_euclid(1.0),
        lightness,
        saturation,
    }
}
