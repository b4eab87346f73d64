use std::io::Cursor;

use log::{debug, warn};

use crate::addr::{AddressBook, RouteTable};
use crate::layer::data_link::{self, DataLink};
use crate::protocol::packet_hdr::{
    self, PacketHeader, PacketHeaderBuilder, MAX_PACKET_LEN, PACKET_HEADER_LEN,
};
use crate::trx::{Timeout, Transceiver};

/// Hop-by-hop forwarding over the data link. A receive loops until a packet
/// addressed to this node arrives; anything else is re-sent toward its next
/// hop with the original `(dest, src)` header.
pub struct Network<T> {
    link: DataLink<T>,
    my_addr: u8,
    routes: RouteTable,
    book: AddressBook,
    stat: LocalStat,
}

pub struct NetworkBuilder<T> {
    pub trx: T,
    pub my_addr: u8,
    pub routes: RouteTable,
    pub book: AddressBook,
}

impl<T: Transceiver> NetworkBuilder<T> {
    #[must_use]
    pub fn build(self) -> Network<T> {
        Network {
            link: DataLink::new(self.trx),
            my_addr: self.my_addr,
            routes: self.routes,
            book: self.book,
            stat: LocalStat {
                delivered: 0,
                forwarded: 0,
                forward_failures: 0,
                decode_drops: 0,
            },
        }
    }
}

#[derive(Debug)]
pub enum TxError {
    Encoding(packet_hdr::Error),
    NoRoute { dest: u8 },
    UnknownPeer { net_addr: u8 },
    Link(data_link::TxError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RxError {
    Timeout,
    Device,
}

impl<T: Transceiver> Network<T> {
    #[must_use]
    #[inline]
    pub fn my_addr(&self) -> u8 {
        self.my_addr
    }

    #[must_use]
    pub fn resolve_net_addr(&self, port: u8) -> Option<u8> {
        self.book.resolve_net_addr(port)
    }

    #[must_use]
    pub fn stat(&self) -> Stat {
        Stat {
            delivered: self.stat.delivered,
            forwarded: self.stat.forwarded,
            forward_failures: self.stat.forward_failures,
            decode_drops: self.stat.decode_drops,
        }
    }

    pub fn tx(&mut self, payload: &[u8], dest: u8, src: u8) -> Result<(), TxError> {
        let hdr = PacketHeaderBuilder {
            payload_len: payload.len(),
            dest,
            src,
        }
        .build()
        .map_err(TxError::Encoding)?;

        let mut pkt = [0u8; MAX_PACKET_LEN];
        hdr.write_to(&mut Cursor::new(&mut pkt[..])).unwrap();
        pkt[PACKET_HEADER_LEN..hdr.len()].copy_from_slice(payload);

        let hop = self.routes.next_hop(dest).ok_or(TxError::NoRoute { dest })?;
        let dl_addr = self
            .book
            .resolve_dl_addr(hop)
            .ok_or(TxError::UnknownPeer { net_addr: hop })?;
        self.link.tx(&pkt[..hdr.len()], dl_addr).map_err(TxError::Link)
    }

    /// Blocks until a packet destined for this node arrives, forwarding any
    /// other traffic along the way. Forwarding failures are swallowed: they
    /// must not look like a local receive error.
    pub fn rx(&mut self, buf: &mut [u8], timeout: Timeout) -> Result<usize, RxError> {
        loop {
            let mut pkt = [0u8; MAX_PACKET_LEN];
            let n = self.link.rx(&mut pkt, timeout).map_err(|e| match e {
                data_link::RxError::Timeout => RxError::Timeout,
                data_link::RxError::Device => RxError::Device,
            })?;

            let hdr = match PacketHeader::from_bytes(&mut Cursor::new(&pkt[..n])) {
                Ok(x) => x,
                Err(_) => {
                    self.stat.decode_drops += 1;
                    warn!("dropping malformed packet");
                    continue;
                }
            };

            if hdr.dest() != self.my_addr {
                self.stat.forwarded += 1;
                debug!("forwarding packet {:#04x} -> {:#04x}", hdr.src(), hdr.dest());
                let payload_end = hdr.len();
                if let Err(e) = self.tx(&pkt[PACKET_HEADER_LEN..payload_end], hdr.dest(), hdr.src())
                {
                    self.stat.forward_failures += 1;
                    warn!("forward to {:#04x} failed: {:?}", hdr.dest(), e);
                }
                continue;
            }

            let payload = &pkt[PACKET_HEADER_LEN..hdr.len()];
            let copy_len = payload.len().min(buf.len());
            buf[..copy_len].copy_from_slice(&payload[..copy_len]);
            self.stat.delivered += 1;
            return Ok(hdr.payload_len());
        }
    }
}

struct LocalStat {
    delivered: u64,
    forwarded: u64,
    forward_failures: u64,
    decode_drops: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Stat {
    pub delivered: u64,
    pub forwarded: u64,
    pub forward_failures: u64,
    pub decode_drops: u64,
}
