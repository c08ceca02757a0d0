use super::{BLACK, Rgb};

/// Downsample `pixels` into `out.len()` equal blocks.
///
/// Block `i` covers `[i * len / k, (i + 1) * len / k)` of the input and is
/// the truncated channel mean of that range. When there are more blocks
/// than pixels each block repeats its nearest source pixel.
pub fn block_average(pixels: &[Rgb], out: &mut [Rgb]) {
    let blocks = out.len();
    let len = pixels.len();
    if len == 0 {
        out.fill(BLACK);
        return;
    }

    for (i, block) in out.iter_mut().enumerate() {
        let start = (i * len / blocks).min(len - 1);
        let end = ((i + 1) * len / blocks).clamp(start + 1, len);
        *block = mean_color(&pixels[start..end]);
    }
}

/// Truncated per-channel mean of a run of pixels
#[allow(clippy::cast_possible_truncation)]
pub fn mean_color(pixels: &[Rgb]) -> Rgb {
    if pixels.is_empty() {
        return BLACK;
    }
    let (r, g, b) = pixels.iter().fold((0u32, 0u32, 0u32), |(r, g, b), p| {
        (r + u32::from(p.r), g + u32::from(p.g), b + u32::from(p.b))
    });
    let count = pixels.len() as u32;
    Rgb {
        r: (r / count) as u8,
        g: (g / count) as u8,
        b: (b / count) as u8,
    }
}
