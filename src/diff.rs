//! Change-only packet encoding for network strips
//!
//! Each datagram is a flat run of 4-byte records:
//!
//! ```text
//! |i|r|g|b|i|r|g|b|...
//! ```
//!
//! where `i` is the zero-based pixel index and `r`, `g`, `b` its color.
//! A datagram carries at most [`MAX_RECORDS_PER_PACKET`] records, so a
//! strip is limited to [`MAX_PIXELS`] addressable pixels.

use heapless::Vec as FixedVec;

use crate::color::Rgb;
use crate::error::{Error, Result};

/// Pixels addressable with a one-byte index
pub const MAX_PIXELS: usize = 256;

/// Bytes per record
pub const RECORD_LEN: usize = 4;

/// Records per datagram
pub const MAX_RECORDS_PER_PACKET: usize = 126;

/// Largest datagram payload
pub const MAX_PACKET_LEN: usize = RECORD_LEN * MAX_RECORDS_PER_PACKET;

/// Payload of one datagram
pub type Packet = FixedVec<u8, MAX_PACKET_LEN>;

/// One changed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub index: u8,
    pub color: Rgb,
}

impl Record {
    pub const fn to_bytes(self) -> [u8; RECORD_LEN] {
        [self.index, self.color.r, self.color.g, self.color.b]
    }

    pub const fn from_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self {
            index: bytes[0],
            color: Rgb {
                r: bytes[1],
                g: bytes[2],
                b: bytes[3],
            },
        }
    }
}

/// Fail if a strip of `len` pixels can not be addressed by the protocol
pub fn check_strip_len(len: usize) -> Result<()> {
    if len > MAX_PIXELS {
        return Err(Error::StripTooLong {
            len,
            max: MAX_PIXELS,
        });
    }
    Ok(())
}

/// Indices whose color differs from what was last sent
///
/// A pixel that was never sent always counts as changed.
pub fn changed_indices<'a>(
    pixels: &'a [Rgb],
    previous: &'a [Option<Rgb>],
) -> impl Iterator<Item = usize> + 'a {
    pixels
        .iter()
        .enumerate()
        .filter(move |&(i, pixel)| previous.get(i).copied().flatten() != Some(*pixel))
        .map(|(i, _)| i)
}

/// Iterate the records of a received datagram
///
/// A trailing partial record is ignored.
pub fn decode_records(packet: &[u8]) -> impl Iterator<Item = Record> + '_ {
    packet
        .chunks_exact(RECORD_LEN)
        .map(|chunk| Record::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// Splits changed pixels into datagrams
///
/// The packet list is reused between frames.
#[derive(Debug, Default)]
pub struct DiffEncoder {
    packets: Vec<Packet>,
}

impl DiffEncoder {
    pub const fn new() -> Self {
        Self {
            packets: Vec::new(),
        }
    }

    /// Encode the pixels that differ from `previous`
    ///
    /// Returns no packets when nothing changed.
    pub fn encode(&mut self, pixels: &[Rgb], previous: &[Option<Rgb>]) -> Result<&[Packet]> {
        check_strip_len(pixels.len())?;
        let indices: FixedVec<usize, MAX_PIXELS> = changed_indices(pixels, previous).collect();
        Ok(self.encode_indices(pixels, &indices))
    }

    /// Encode every pixel regardless of what was sent before
    pub fn encode_full(&mut self, pixels: &[Rgb]) -> Result<&[Packet]> {
        check_strip_len(pixels.len())?;
        let indices: FixedVec<usize, MAX_PIXELS> = (0..pixels.len()).collect();
        Ok(self.encode_indices(pixels, &indices))
    }

    /// Packets produced by the last encode call
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_indices(&mut self, pixels: &[Rgb], indices: &[usize]) -> &[Packet] {
        self.packets.clear();
        for chunk in indices.chunks(MAX_RECORDS_PER_PACKET) {
            let packet: Packet = chunk
                .iter()
                .flat_map(|&index| {
                    Record {
                        index: index as u8,
                        color: pixels[index],
                    }
                    .to_bytes()
                })
                .collect();
            self.packets.push(packet);
        }
        &self.packets
    }
}
