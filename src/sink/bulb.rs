//! Smart bulbs
//!
//! Bulbs show a single color: the strip midpoint converted to HLS and
//! scaled to 16-bit components. Commands go out over the bulbs' LAN
//! protocol: a 36-byte little-endian header followed by the message
//! payload.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use super::{Frame, Sink};
use crate::color::{BLACK, Rgb, rgb_to_hls};
use crate::error::{Error, Result};

/// Color temperature sent along with every color
pub const DEFAULT_KELVIN: u16 = 3500;

/// UDP port bulbs listen on
pub const DEFAULT_BULB_PORT: u16 = 56700;

/// Size of the message header
pub const HEADER_LEN: usize = 36;

/// Size of a `SetColor` message
pub const SET_COLOR_LEN: usize = HEADER_LEN + 13;

/// Message type of `SetColor`
pub const SET_COLOR_MESSAGE: u16 = 102;

/// Message type of `Acknowledgement`
pub const ACK_MESSAGE: u16 = 45;

const PROTOCOL: u16 = 1024;
const ADDRESSABLE: u16 = 1 << 12;
const TAGGED: u16 = 1 << 13;
const ACK_REQUIRED: u8 = 1 << 1;

/// Bulb-native color command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulbCommand {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl BulbCommand {
    /// Convert an 8-bit color, lightness becomes brightness
    pub fn from_rgb(color: Rgb, kelvin: u16) -> Self {
        let hls = rgb_to_hls(color);
        Self {
            hue: scale16(hls.hue),
            saturation: scale16(hls.saturation),
            brightness: scale16(hls.lightness),
            kelvin,
        }
    }

    /// Zero brightness
    pub const fn off(kelvin: u16) -> Self {
        Self {
            hue: 0,
            saturation: 0,
            brightness: 0,
            kelvin,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16
}

/// Serialize a `SetColor` message addressed to every bulb behind the target
pub fn encode_set_color(
    command: &BulbCommand,
    source: u32,
    sequence: u8,
    ack_required: bool,
) -> [u8; SET_COLOR_LEN] {
    let mut packet = [0u8; SET_COLOR_LEN];

    // Frame
    #[allow(clippy::cast_possible_truncation)]
    let size = SET_COLOR_LEN as u16;
    packet[0..2].copy_from_slice(&size.to_le_bytes());
    packet[2..4].copy_from_slice(&(PROTOCOL | ADDRESSABLE | TAGGED).to_le_bytes());
    packet[4..8].copy_from_slice(&source.to_le_bytes());

    // Frame address: zero target, reserved bytes stay zero
    if ack_required {
        packet[22] = ACK_REQUIRED;
    }
    packet[23] = sequence;

    // Protocol header
    packet[32..34].copy_from_slice(&SET_COLOR_MESSAGE.to_le_bytes());

    // Payload, the first byte is reserved
    packet[37..39].copy_from_slice(&command.hue.to_le_bytes());
    packet[39..41].copy_from_slice(&command.saturation.to_le_bytes());
    packet[41..43].copy_from_slice(&command.brightness.to_le_bytes());
    packet[43..45].copy_from_slice(&command.kelvin.to_le_bytes());
    // Transition duration (u32 ms) stays zero

    packet
}

/// Connection to one bulb
pub trait BulbTransport {
    /// Deliver a command, unreachable bulbs report `DeviceUnreachable`
    fn send(&mut self, command: &BulbCommand) -> Result<()>;
}

/// Bulb reached over the LAN protocol
///
/// The first command asks for an acknowledgement; a bulb that does not
/// answer within the timeout is reported unreachable. Later commands are
/// fire-and-forget.
pub struct LanBulb {
    socket: UdpSocket,
    address: SocketAddr,
    source: u32,
    sequence: u8,
    timeout: Duration,
    confirmed: bool,
}

impl LanBulb {
    pub fn connect(address: SocketAddr, timeout: Duration) -> Result<Self> {
        let timeout = timeout.max(Duration::from_millis(1));
        let local: SocketAddr = if address.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_write_timeout(Some(timeout))?;
        socket.set_read_timeout(Some(timeout))?;

        Ok(Self {
            socket,
            address,
            source: std::process::id().max(2),
            sequence: 0,
            timeout,
            confirmed: false,
        })
    }

    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    fn unreachable(&self, reason: impl core::fmt::Display) -> Error {
        Error::DeviceUnreachable(format!("bulb {}: {}", self.address, reason))
    }

    fn wait_for_ack(&self, sequence: u8) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        let mut buffer = [0u8; 128];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            // No single read may outlast the deadline
            self.socket
                .set_read_timeout(Some(remaining))
                .map_err(|err| self.unreachable(err))?;
            match self.socket.recv_from(&mut buffer) {
                Ok((len, from)) => {
                    let is_ack = len >= HEADER_LEN
                        && u16::from_le_bytes([buffer[32], buffer[33]]) == ACK_MESSAGE
                        && buffer[23] == sequence;
                    if from == self.address && is_ack {
                        return Ok(());
                    }
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    break;
                }
                Err(err) => return Err(self.unreachable(err)),
            }
        }
        Err(self.unreachable(format_args!(
            "no acknowledgement within {:?}",
            self.timeout
        )))
    }
}

impl BulbTransport for LanBulb {
    fn send(&mut self, command: &BulbCommand) -> Result<()> {
        let ack_required = !self.confirmed;
        self.sequence = self.sequence.wrapping_add(1);
        let packet = encode_set_color(command, self.source, self.sequence, ack_required);

        self.socket
            .send_to(&packet, self.address)
            .map_err(|err| self.unreachable(err))?;

        if ack_required {
            self.wait_for_ack(self.sequence)?;
            self.confirmed = true;
            tracing::debug!("Bulb {} acknowledged", self.address);
        }
        Ok(())
    }
}

/// Bulbs following the strip midpoint
///
/// Runs on every fourth tick. Any bulb failure disables the whole group.
pub struct SmartBulbGroup {
    bulbs: Vec<Box<dyn BulbTransport>>,
    kelvin: u16,
}

impl SmartBulbGroup {
    pub fn new(bulbs: Vec<Box<dyn BulbTransport>>, kelvin: u16) -> Self {
        tracing::info!("Smart bulb group of {} bulbs at {}K", bulbs.len(), kelvin);
        Self { bulbs, kelvin }
    }

    /// Open a LAN connection to every address
    pub fn connect(addresses: &[SocketAddr], kelvin: u16, timeout: Duration) -> Result<Self> {
        let bulbs = addresses
            .iter()
            .map(|&address| {
                LanBulb::connect(address, timeout)
                    .map(|bulb| Box::new(bulb) as Box<dyn BulbTransport>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(bulbs, kelvin))
    }

    fn broadcast(&mut self, command: &BulbCommand) -> Result<()> {
        for bulb in &mut self.bulbs {
            bulb.send(command).map_err(|err| match err {
                Error::DeviceUnreachable(_) => err,
                other => Error::DeviceUnreachable(other.to_string()),
            })?;
        }
        Ok(())
    }
}

impl Sink for SmartBulbGroup {
    const DIVISOR: u32 = 4;

    fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        let midpoint = frame
            .quantized
            .get(frame.quantized.len() / 2)
            .copied()
            .unwrap_or(BLACK);
        let command = BulbCommand::from_rgb(midpoint, self.kelvin);
        self.broadcast(&command)
    }

    fn all_off(&mut self) -> Result<()> {
        self.broadcast(&BulbCommand::off(self.kelvin))
    }
}
