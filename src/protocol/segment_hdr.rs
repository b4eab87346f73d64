use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::protocol::packet_hdr::MAX_PACKET_PAYLOAD_LEN;
use crate::utils::SeqBit;

pub const MAX_SEGMENT_LEN: usize = MAX_PACKET_PAYLOAD_LEN;
pub const START_SEGMENT_HEADER_LEN: usize = 7;
pub const DATA_SEGMENT_HEADER_LEN: usize = 7;
pub const END_SEGMENT_HEADER_LEN: usize = 5;
pub const ACK_SEGMENT_HEADER_LEN: usize = 5;
pub const MAX_DATA_PAYLOAD_LEN: usize = MAX_SEGMENT_LEN - DATA_SEGMENT_HEADER_LEN;

pub struct SegmentHeader {
    seq: SeqBit,
    dst_port: u8,
    src_port: u8,
    cmd: SegmentCommand,
}

pub struct SegmentHeaderBuilder {
    pub seq: SeqBit,
    pub dst_port: u8,
    pub src_port: u8,
    pub cmd: SegmentCommand,
}

impl SegmentHeaderBuilder {
    pub fn build(self) -> Result<SegmentHeader, Error> {
        if let SegmentCommand::Data { payload_len, .. } = self.cmd {
            if payload_len == 0 {
                return Err(Error::EmptyPayload);
            }
            if payload_len as usize > MAX_DATA_PAYLOAD_LEN {
                return Err(Error::PayloadTooLong);
            }
        }
        let this = SegmentHeader {
            seq: self.seq,
            dst_port: self.dst_port,
            src_port: self.src_port,
            cmd: self.cmd,
        };
        this.check_rep();
        Ok(this)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentCommand {
    Start { message_len: u16 },
    Data { offset: u16, payload_len: u8 },
    End,
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SegmentKind {
    StartOfMessage = 0x07,
    EndOfMessage = 0x09,
    Ack = 0x0A,
    Data = 0x0D,
}

#[derive(Debug)]
pub enum Error {
    Decoding { field: &'static str },
    EmptyPayload,
    PayloadTooLong,
    NotEnoughSpace,
}

impl SegmentHeader {
    #[inline]
    fn check_rep(&self) {
        if let SegmentCommand::Data { payload_len, .. } = self.cmd {
            assert!(payload_len > 0);
            assert!(payload_len as usize <= MAX_DATA_PAYLOAD_LEN);
        }
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, Error> {
        let len = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "len" })?;
        let seq = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "seq" })?;
        let seq = SeqBit::try_from_u8(seq).ok_or(Error::Decoding { field: "seq" })?;
        let dst_port = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "dst_port" })?;
        let src_port = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "src_port" })?;
        let id = rdr.read_u8().map_err(|_e| Error::Decoding { field: "id" })?;
        let kind = SegmentKind::try_from(id).map_err(|_e| Error::Decoding { field: "id" })?;
        let cmd = match kind {
            SegmentKind::StartOfMessage => {
                if len as usize != START_SEGMENT_HEADER_LEN {
                    return Err(Error::Decoding { field: "len" });
                }
                let message_len = rdr
                    .read_u16::<BigEndian>()
                    .map_err(|_e| Error::Decoding { field: "message_len" })?;
                SegmentCommand::Start { message_len }
            }
            SegmentKind::Data => {
                if (len as usize) <= DATA_SEGMENT_HEADER_LEN || MAX_SEGMENT_LEN < len as usize {
                    return Err(Error::Decoding { field: "len" });
                }
                let offset = rdr
                    .read_u16::<BigEndian>()
                    .map_err(|_e| Error::Decoding { field: "offset" })?;
                SegmentCommand::Data {
                    offset,
                    payload_len: len - DATA_SEGMENT_HEADER_LEN as u8,
                }
            }
            SegmentKind::EndOfMessage => {
                if len as usize != END_SEGMENT_HEADER_LEN {
                    return Err(Error::Decoding { field: "len" });
                }
                SegmentCommand::End
            }
            SegmentKind::Ack => {
                if len as usize != ACK_SEGMENT_HEADER_LEN {
                    return Err(Error::Decoding { field: "len" });
                }
                SegmentCommand::Ack
            }
        };

        let this = SegmentHeader {
            seq,
            dst_port,
            src_port,
            cmd,
        };
        this.check_rep();
        Ok(this)
    }

    /// Writes the header. A DATA payload is appended by the caller; the
    /// length byte already accounts for it.
    pub fn write_to(&self, wtr: &mut io::Cursor<&mut [u8]>) -> Result<(), Error> {
        wtr.write_u8(self.encoded_len() as u8)
            .map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.seq.to_u8())
            .map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.dst_port)
            .map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.src_port)
            .map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.kind().into())
            .map_err(|_e| Error::NotEnoughSpace)?;
        match self.cmd {
            SegmentCommand::Start { message_len } => {
                wtr.write_u16::<BigEndian>(message_len)
                    .map_err(|_e| Error::NotEnoughSpace)?;
            }
            SegmentCommand::Data { offset, .. } => {
                wtr.write_u16::<BigEndian>(offset)
                    .map_err(|_e| Error::NotEnoughSpace)?;
            }
            SegmentCommand::End => {}
            SegmentCommand::Ack => {}
        }
        Ok(())
    }

    /// Total encoded segment length, DATA payload included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self.cmd {
            SegmentCommand::Start { .. } => START_SEGMENT_HEADER_LEN,
            SegmentCommand::Data { payload_len, .. } => {
                DATA_SEGMENT_HEADER_LEN + payload_len as usize
            }
            SegmentCommand::End => END_SEGMENT_HEADER_LEN,
            SegmentCommand::Ack => ACK_SEGMENT_HEADER_LEN,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        match self.cmd {
            SegmentCommand::Start { .. } => SegmentKind::StartOfMessage,
            SegmentCommand::Data { .. } => SegmentKind::Data,
            SegmentCommand::End => SegmentKind::EndOfMessage,
            SegmentCommand::Ack => SegmentKind::Ack,
        }
    }

    #[must_use]
    #[inline]
    pub fn seq(&self) -> SeqBit {
        self.seq
    }

    #[must_use]
    #[inline]
    pub fn dst_port(&self) -> u8 {
        self.dst_port
    }

    #[must_use]
    #[inline]
    pub fn src_port(&self) -> u8 {
        self.src_port
    }

    #[must_use]
    #[inline]
    pub fn cmd(&self) -> &SegmentCommand {
        &self.cmd
    }
}
