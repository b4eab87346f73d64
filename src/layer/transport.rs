//! Stop-and-wait transport.
//!
//! Receiver: every segment that arrives is acknowledged with the complement
//! of its sequence bit, no matter what. A segment whose bit does not match
//! `expected_seq` is a retransmission (our previous ack was lost); it was
//! re-acked and is otherwise ignored. A START_OF_MESSAGE resynchronizes
//! `expected_seq`, so a fresh sender needs no prior agreement.
//!
//! Transmitter: both sides start a message at sequence 0. Send one segment,
//! wait for an ack carrying the complemented bit, then advance. A timeout,
//! a non-ack, or an ack with our own bit all mean "try the same segment
//! again", up to the attempt limit.
//!
//! Only one peer may transmit a message to a given receiver at a time.

use std::io::Cursor;

use log::{debug, warn};

use crate::addr::{AddressBook, RouteTable};
use crate::clock::Clock;
use crate::layer::network::{self, Network, NetworkBuilder};
use crate::protocol::segment_hdr::{
    SegmentCommand, SegmentHeader, SegmentHeaderBuilder, SegmentKind, ACK_SEGMENT_HEADER_LEN,
    DATA_SEGMENT_HEADER_LEN, MAX_DATA_PAYLOAD_LEN, MAX_SEGMENT_LEN,
};
use crate::trx::{Timeout, Transceiver};
use crate::utils::SeqBit;

pub const ACK_TIMEOUT_MS: u16 = 1500;
pub const ACK_DELAY_MS: u16 = 250;
pub const SEGMENT_SPACING_MS: u16 = 250;
pub const RETRY_DELAY_MS: u16 = 250;
pub const ATTEMPT_LIMIT: usize = 10;

pub struct Transport<T, C> {
    net: Network<T>,
    clock: C,
    my_port: u8,
    expected_seq: SeqBit,
    stat: LocalStat,
}

pub struct TransportBuilder<T, C> {
    pub trx: T,
    pub clock: C,
    pub my_port: u8,
    pub my_net_addr: u8,
    pub routes: RouteTable,
    pub book: AddressBook,
}

impl<T: Transceiver, C: Clock> TransportBuilder<T, C> {
    #[must_use]
    pub fn build(self) -> Transport<T, C> {
        Transport {
            net: NetworkBuilder {
                trx: self.trx,
                my_addr: self.my_net_addr,
                routes: self.routes,
                book: self.book,
            }
            .build(),
            clock: self.clock,
            my_port: self.my_port,
            expected_seq: SeqBit::ZERO,
            stat: LocalStat {
                retries: 0,
                duplicates: 0,
                acks_sent: 0,
                decode_drops: 0,
            },
        }
    }
}

#[derive(Debug)]
pub enum TxError {
    MessageTooLong,
    UnknownPort { port: u8 },
    ReachedAttemptLimit,
    Device,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RxError {
    Timeout,
    Device,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RxMessage {
    pub message_len: u16,
    pub source_port: u8,
}

enum RxState {
    Idle,
    Receiving,
}

enum AttemptRx {
    Success(SegmentHeader),
    Outdated,
    Garbage,
    Timeout,
    Error,
}

enum AttemptTx {
    Success,
    NotAcknowledged,
    NotAnAck,
    OldAck,
    Error,
}

impl<T: Transceiver, C: Clock> Transport<T, C> {
    #[must_use]
    pub fn stat(&self) -> Stat {
        Stat {
            retries: self.stat.retries,
            duplicates: self.stat.duplicates,
            acks_sent: self.stat.acks_sent,
            decode_drops: self.stat.decode_drops,
        }
    }

    // ---- receiver ----

    /// Receives one whole message. `buf` is zeroed first; DATA payloads
    /// land at their offsets, clamped to the buffer.
    pub fn rx(&mut self, buf: &mut [u8], timeout: Timeout) -> Result<RxMessage, RxError> {
        buf.fill(0);

        let mut state = RxState::Idle;
        let mut seg = [0u8; MAX_SEGMENT_LEN];
        let mut message_len: u16 = 0;
        let mut source_port: u8 = 0;

        loop {
            let hdr = self.keep_trying_to_rx(&mut seg, timeout)?;
            match state {
                RxState::Idle => {
                    if let SegmentCommand::Start { message_len: len } = *hdr.cmd() {
                        source_port = hdr.src_port();
                        message_len = len;
                        state = RxState::Receiving;
                    }
                }
                RxState::Receiving => match *hdr.cmd() {
                    SegmentCommand::Data {
                        offset,
                        payload_len,
                    } => {
                        let payload = &seg[DATA_SEGMENT_HEADER_LEN
                            ..DATA_SEGMENT_HEADER_LEN + payload_len as usize];
                        let start = offset as usize;
                        if start < buf.len() {
                            let end = (start + payload.len()).min(buf.len());
                            buf[start..end].copy_from_slice(&payload[..end - start]);
                        }
                    }
                    SegmentCommand::End => {
                        return Ok(RxMessage {
                            message_len,
                            source_port,
                        });
                    }
                    // the peer gave up and restarted the message
                    SegmentCommand::Start { message_len: len } => {
                        message_len = len;
                    }
                    // stray from a prior conversation; it was acked already
                    SegmentCommand::Ack => {}
                },
            }
        }
    }

    /// Retries past duplicates and transient radio errors so they never
    /// abort a message. Consecutive radio errors beyond the attempt limit
    /// surface as unrecoverable.
    fn keep_trying_to_rx(
        &mut self,
        seg: &mut [u8; MAX_SEGMENT_LEN],
        timeout: Timeout,
    ) -> Result<SegmentHeader, RxError> {
        let mut consecutive_errors = 0;
        loop {
            match self.attempt_rx(seg, timeout) {
                AttemptRx::Success(hdr) => return Ok(hdr),
                AttemptRx::Outdated => consecutive_errors = 0,
                AttemptRx::Garbage => consecutive_errors = 0,
                AttemptRx::Timeout => return Err(RxError::Timeout),
                AttemptRx::Error => {
                    consecutive_errors += 1;
                    if consecutive_errors >= ATTEMPT_LIMIT {
                        return Err(RxError::Device);
                    }
                    debug!("radio error while receiving, retrying");
                }
            }
        }
    }

    /// Receives one segment and acknowledges it, new or not.
    fn attempt_rx(&mut self, seg: &mut [u8; MAX_SEGMENT_LEN], timeout: Timeout) -> AttemptRx {
        seg.fill(0);
        let n = match self.net.rx(seg, timeout) {
            Ok(n) => n.min(MAX_SEGMENT_LEN),
            Err(network::RxError::Timeout) => return AttemptRx::Timeout,
            Err(network::RxError::Device) => return AttemptRx::Error,
        };

        let hdr = match SegmentHeader::from_bytes(&mut Cursor::new(&seg[..n])) {
            Ok(x) => x,
            Err(_) => {
                self.stat.decode_drops += 1;
                warn!("dropping undecodable segment");
                return AttemptRx::Garbage;
            }
        };

        // a START_OF_MESSAGE resynchronizes the expected sequence number
        if hdr.kind() == SegmentKind::StartOfMessage {
            self.expected_seq = hdr.seq();
        }

        // acknowledge first; give the peer time to turn its radio around
        self.clock.sleep_ms(ACK_DELAY_MS);
        self.send_ack(&hdr);

        if hdr.seq() != self.expected_seq {
            self.stat.duplicates += 1;
            return AttemptRx::Outdated;
        }

        self.expected_seq.toggle();
        AttemptRx::Success(hdr)
    }

    /// A failed ack is no problem: the peer retransmits and we ack again.
    fn send_ack(&mut self, received: &SegmentHeader) {
        let ack = SegmentHeaderBuilder {
            seq: received.seq().complement(),
            dst_port: received.src_port(),
            src_port: self.my_port,
            cmd: SegmentCommand::Ack,
        }
        .build()
        .unwrap();
        let mut bytes = [0u8; ACK_SEGMENT_HEADER_LEN];
        ack.write_to(&mut Cursor::new(&mut bytes[..])).unwrap();

        let dest_net = match self.net.resolve_net_addr(received.src_port()) {
            Some(x) => x,
            None => {
                warn!(
                    "no network address for port {:#04x}, ack not sent",
                    received.src_port()
                );
                return;
            }
        };
        let my_addr = self.net.my_addr();
        if let Err(e) = self.net.tx(&bytes, dest_net, my_addr) {
            warn!("ack transmit failed: {:?}", e);
            return;
        }
        self.stat.acks_sent += 1;
    }

    // ---- transmitter ----

    /// Sends one whole message: START_OF_MESSAGE, the DATA segments in
    /// offset order, END_OF_MESSAGE, each acknowledged before the next.
    pub fn tx(&mut self, message: &[u8], dest_port: u8) -> Result<(), TxError> {
        if message.len() > u16::MAX as usize {
            return Err(TxError::MessageTooLong);
        }
        let message_len = message.len() as u16;
        let dest_net = match self.net.resolve_net_addr(dest_port) {
            Some(x) => x,
            None => return Err(TxError::UnknownPort { port: dest_port }),
        };

        let mut current_seq = SeqBit::ZERO;
        let mut seg = [0u8; MAX_SEGMENT_LEN];

        let n = self.encode_segment(
            &mut seg,
            current_seq,
            dest_port,
            SegmentCommand::Start { message_len },
        );
        self.keep_trying_to_tx(&seg[..n], dest_net, current_seq)?;
        current_seq.toggle();
        self.clock.sleep_ms(SEGMENT_SPACING_MS);

        let mut bytes_remaining = message.len();
        while bytes_remaining > 0 {
            let payload_len = bytes_remaining.min(MAX_DATA_PAYLOAD_LEN);
            let offset = message.len() - bytes_remaining;
            let n = self.encode_segment(
                &mut seg,
                current_seq,
                dest_port,
                SegmentCommand::Data {
                    offset: offset as u16,
                    payload_len: payload_len as u8,
                },
            );
            seg[DATA_SEGMENT_HEADER_LEN..n]
                .copy_from_slice(&message[offset..offset + payload_len]);
            self.keep_trying_to_tx(&seg[..n], dest_net, current_seq)?;
            bytes_remaining -= payload_len;
            current_seq.toggle();
            self.clock.sleep_ms(SEGMENT_SPACING_MS);
        }

        let n = self.encode_segment(&mut seg, current_seq, dest_port, SegmentCommand::End);
        self.keep_trying_to_tx(&seg[..n], dest_net, current_seq)?;

        Ok(())
    }

    fn encode_segment(
        &self,
        seg: &mut [u8; MAX_SEGMENT_LEN],
        seq: SeqBit,
        dst_port: u8,
        cmd: SegmentCommand,
    ) -> usize {
        let hdr = SegmentHeaderBuilder {
            seq,
            dst_port,
            src_port: self.my_port,
            cmd,
        }
        .build()
        .unwrap();
        hdr.write_to(&mut Cursor::new(&mut seg[..])).unwrap();
        hdr.encoded_len()
    }

    /// Retransmits the same segment until it is acknowledged, bounded by
    /// the attempt limit.
    fn keep_trying_to_tx(
        &mut self,
        seg: &[u8],
        dest_net: u8,
        current_seq: SeqBit,
    ) -> Result<(), TxError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if attempts > ATTEMPT_LIMIT {
                return Err(TxError::ReachedAttemptLimit);
            }
            match self.attempt_tx(seg, dest_net, current_seq) {
                AttemptTx::Success => return Ok(()),
                AttemptTx::Error => return Err(TxError::Device),
                AttemptTx::NotAcknowledged | AttemptTx::NotAnAck | AttemptTx::OldAck => {
                    self.stat.retries += 1;
                    debug!("segment not acknowledged (attempt {}), retrying", attempts);
                }
            }
            self.clock.sleep_ms(RETRY_DELAY_MS);
        }
    }

    /// Transmits a segment and waits for its acknowledgement.
    fn attempt_tx(&mut self, seg: &[u8], dest_net: u8, current_seq: SeqBit) -> AttemptTx {
        // The radio sometimes reports a failure even when the transmission
        // went out. Only the transport-level ack decides success.
        let my_addr = self.net.my_addr();
        if let Err(e) = self.net.tx(seg, dest_net, my_addr) {
            debug!("segment transmit reported {:?}, waiting for ack anyway", e);
        }

        let mut ack = [0u8; MAX_SEGMENT_LEN];
        let n = match self.net.rx(&mut ack, Timeout::Millis(ACK_TIMEOUT_MS)) {
            Ok(n) => n.min(MAX_SEGMENT_LEN),
            Err(network::RxError::Timeout) => return AttemptTx::NotAcknowledged,
            Err(network::RxError::Device) => return AttemptTx::Error,
        };
        let hdr = match SegmentHeader::from_bytes(&mut Cursor::new(&ack[..n])) {
            Ok(x) => x,
            Err(_) => return AttemptTx::NotAnAck,
        };
        if hdr.kind() != SegmentKind::Ack {
            return AttemptTx::NotAnAck;
        }
        if hdr.seq() == current_seq {
            // the peer re-acked the previous segment; ours hasn't landed
            return AttemptTx::OldAck;
        }
        AttemptTx::Success
    }
}

struct LocalStat {
    retries: u64,
    duplicates: u64,
    acks_sent: u64,
    decode_drops: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Stat {
    pub retries: u64,
    pub duplicates: u64,
    pub acks_sent: u64,
    pub decode_drops: u64,
}
