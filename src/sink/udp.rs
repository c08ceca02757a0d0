use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use heapless::Vec as FixedVec;

use super::{Frame, Sink};
use crate::color::{BLACK, Rgb};
use crate::diff::{DiffEncoder, Packet, check_strip_len};
use crate::error::{Error, Result};

/// Datagram transport of a network strip
pub trait Datagram {
    fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<usize>;
}

impl Datagram for UdpSocket {
    fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, payload, target)
    }
}

/// LED strip driven by a network controller over UDP
///
/// Only changed pixels are sent, see [`crate::diff`]. Every packet goes to
/// the primary controller and, when mirroring is enabled, to the secondary
/// one as well.
pub struct UdpStrip {
    transport: Box<dyn Datagram>,
    targets: FixedVec<SocketAddr, 2>,
    encoder: DiffEncoder,
    len: usize,
}

impl UdpStrip {
    /// Bind an ephemeral socket for a strip of `len` pixels
    ///
    /// Sends block for at most `timeout`.
    pub fn bind(
        len: usize,
        target: SocketAddr,
        mirror: Option<SocketAddr>,
        timeout: Duration,
    ) -> Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_write_timeout(Some(timeout.max(Duration::from_millis(1))))?;

        tracing::info!("UDP strip of {} pixels -> {}", len, target);
        if let Some(mirror) = mirror {
            tracing::info!("Mirroring UDP strip to {}", mirror);
        }
        Self::with_transport(Box::new(socket), len, target, mirror)
    }

    /// Create a strip on top of an existing transport
    pub fn with_transport(
        transport: Box<dyn Datagram>,
        len: usize,
        target: SocketAddr,
        mirror: Option<SocketAddr>,
    ) -> Result<Self> {
        check_strip_len(len)?;
        let mut targets = FixedVec::new();
        targets.extend(core::iter::once(target).chain(mirror));
        Ok(Self {
            transport,
            targets,
            encoder: DiffEncoder::new(),
            len,
        })
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn targets(&self) -> &[SocketAddr] {
        &self.targets
    }
}

fn transmit(transport: &dyn Datagram, targets: &[SocketAddr], packets: &[Packet]) -> Result<()> {
    for packet in packets {
        for target in targets {
            transport
                .send_to(packet, *target)
                .map_err(Error::TransientSend)?;
        }
    }
    tracing::trace!("Sent {} packets to {:?}", packets.len(), targets);
    Ok(())
}

impl Sink for UdpStrip {
    const TRACKS_DIFF: bool = true;

    fn send(&mut self, frame: &Frame<'_>) -> Result<()> {
        let packets = self.encoder.encode(frame.corrected, frame.previous)?;
        transmit(self.transport.as_ref(), &self.targets, packets)
    }

    fn all_off(&mut self) -> Result<()> {
        let black: Vec<Rgb> = vec![BLACK; self.len];
        let packets = self.encoder.encode_full(&black)?;
        transmit(self.transport.as_ref(), &self.targets, packets)
    }
}
