//! Test doubles and a small fixed topology: node A (port 0x3C, net 0x0A),
//! relay B (net 0x0B), node C (port 0x0A, net 0x0C). Every node routes
//! directly to the others.

use std::collections::VecDeque;
use std::io::Cursor;

use crate::addr::{AddressBook, AddressBookBuilder, RouteTable, RouteTableBuilder};
use crate::clock::Clock;
use crate::layer::network::{Network, NetworkBuilder};
use crate::layer::transport::{Transport, TransportBuilder};
use crate::protocol::frame;
use crate::protocol::packet_hdr::{PacketHeaderBuilder, PACKET_HEADER_LEN};
use crate::protocol::segment_hdr::{SegmentCommand, SegmentHeaderBuilder, DATA_SEGMENT_HEADER_LEN};
use crate::trx::{ReceiveError, Timeout, TransmitError, Transceiver, TRX_PAYLOAD_LENGTH};
use crate::utils::SeqBit;

pub const PORT_A: u8 = 0x3C;
pub const PORT_C: u8 = 0x0A;

pub fn dl_addr_of(net_addr: u8) -> u32 {
    0xA000_0000 | u32::from(net_addr)
}

pub fn book() -> AddressBook {
    AddressBookBuilder {
        links: vec![
            (0x0A, dl_addr_of(0x0A)),
            (0x0B, dl_addr_of(0x0B)),
            (0x0C, dl_addr_of(0x0C)),
        ],
        ports: vec![(PORT_A, 0x0A), (PORT_C, 0x0C)],
    }
    .build()
    .unwrap()
}

pub fn routes_direct() -> RouteTable {
    RouteTableBuilder {
        hops: vec![(0x0A, 0x0A), (0x0B, 0x0B), (0x0C, 0x0C)],
    }
    .build()
    .unwrap()
}

pub fn net_for(my_addr: u8, trx: &mut MockTrx) -> Network<&mut MockTrx> {
    NetworkBuilder {
        trx,
        my_addr,
        routes: routes_direct(),
        book: book(),
    }
    .build()
}

pub fn transport_for<'t, 'c>(
    my_port: u8,
    my_net_addr: u8,
    trx: &'t mut MockTrx,
    clock: &'c mut MockClock,
) -> Transport<&'t mut MockTrx, &'c mut MockClock> {
    TransportBuilder {
        trx,
        clock,
        my_port,
        my_net_addr,
        routes: routes_direct(),
        book: book(),
    }
    .build()
}

pub enum RxEvent {
    Frame([u8; TRX_PAYLOAD_LENGTH]),
    Timeout,
    Device,
}

/// A scripted radio. Incoming events are served in order; once the script
/// runs dry, receives time out, or, in acking mode, answer with an ack for
/// the segment transmitted last.
pub struct MockTrx {
    pub sent: Vec<(u32, [u8; TRX_PAYLOAD_LENGTH])>,
    pub incoming: VecDeque<RxEvent>,
    pub auto_ack: bool,
    pub transmit_fails: bool,
}

impl MockTrx {
    pub fn quiet() -> Self {
        MockTrx {
            sent: Vec::new(),
            incoming: VecDeque::new(),
            auto_ack: false,
            transmit_fails: false,
        }
    }

    pub fn acking() -> Self {
        MockTrx {
            auto_ack: true,
            ..MockTrx::quiet()
        }
    }

    pub fn push_frame(&mut self, frame: [u8; TRX_PAYLOAD_LENGTH]) {
        self.incoming.push_back(RxEvent::Frame(frame));
    }

    pub fn push_timeout(&mut self) {
        self.incoming.push_back(RxEvent::Timeout);
    }

    pub fn push_device_error(&mut self) {
        self.incoming.push_back(RxEvent::Device);
    }

    fn ack_for_last_sent(&self) -> Option<[u8; TRX_PAYLOAD_LENGTH]> {
        let (_, f) = self.sent.last()?;
        // frame: [frame_len, pkt_len, dest, src, seg_len, seq, dst_port, src_port, id, ..]
        let seq = SeqBit::try_from_u8(f[5])?;
        Some(segment_frame(
            seq.complement(),
            f[7],
            f[6],
            SegmentCommand::Ack,
            &[],
            f[3],
            f[2],
        ))
    }
}

impl Transceiver for MockTrx {
    fn transmit(
        &mut self,
        addr: u32,
        payload: &[u8; TRX_PAYLOAD_LENGTH],
    ) -> Result<(), TransmitError> {
        self.sent.push((addr, *payload));
        if self.transmit_fails {
            return Err(TransmitError::Device);
        }
        Ok(())
    }

    fn receive(
        &mut self,
        out: &mut [u8; TRX_PAYLOAD_LENGTH],
        _timeout: Timeout,
    ) -> Result<(), ReceiveError> {
        if let Some(event) = self.incoming.pop_front() {
            return match event {
                RxEvent::Frame(f) => {
                    *out = f;
                    Ok(())
                }
                RxEvent::Timeout => Err(ReceiveError::Timeout),
                RxEvent::Device => Err(ReceiveError::Device),
            };
        }
        if self.auto_ack {
            if let Some(f) = self.ack_for_last_sent() {
                *out = f;
                return Ok(());
            }
        }
        Err(ReceiveError::Timeout)
    }
}

/// Records every sleep instead of sleeping.
pub struct MockClock {
    pub slept: Vec<u16>,
}

impl MockClock {
    pub fn new() -> Self {
        MockClock { slept: Vec::new() }
    }
}

impl Clock for MockClock {
    fn sleep_ms(&mut self, ms: u16) {
        self.slept.push(ms);
    }
}

pub fn packet_frame(payload: &[u8], dest: u8, src: u8) -> [u8; TRX_PAYLOAD_LENGTH] {
    let hdr = PacketHeaderBuilder {
        payload_len: payload.len(),
        dest,
        src,
    }
    .build()
    .unwrap();
    let mut pkt = vec![0u8; hdr.len()];
    hdr.write_to(&mut Cursor::new(&mut pkt[..])).unwrap();
    pkt[PACKET_HEADER_LEN..].copy_from_slice(payload);
    frame::build(&pkt).unwrap()
}

pub fn segment_frame(
    seq: SeqBit,
    dst_port: u8,
    src_port: u8,
    cmd: SegmentCommand,
    payload: &[u8],
    dest_net: u8,
    src_net: u8,
) -> [u8; TRX_PAYLOAD_LENGTH] {
    let hdr = SegmentHeaderBuilder {
        seq,
        dst_port,
        src_port,
        cmd,
    }
    .build()
    .unwrap();
    let mut seg = vec![0u8; hdr.encoded_len()];
    hdr.write_to(&mut Cursor::new(&mut seg[..])).unwrap();
    if let SegmentCommand::Data { payload_len, .. } = cmd {
        assert_eq!(payload.len(), payload_len as usize);
        seg[DATA_SEGMENT_HEADER_LEN..].copy_from_slice(payload);
    }
    packet_frame(&seg, dest_net, src_net)
}
