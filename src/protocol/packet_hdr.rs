use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::protocol::frame::MAX_FRAME_PAYLOAD_LEN;

pub const PACKET_HEADER_LEN: usize = 3;
pub const MAX_PACKET_LEN: usize = MAX_FRAME_PAYLOAD_LEN;
pub const MAX_PACKET_PAYLOAD_LEN: usize = MAX_PACKET_LEN - PACKET_HEADER_LEN;

pub struct PacketHeader {
    len: u8,
    dest: u8,
    src: u8,
}

pub struct PacketHeaderBuilder {
    pub payload_len: usize,
    pub dest: u8,
    pub src: u8,
}

impl PacketHeaderBuilder {
    pub fn build(self) -> Result<PacketHeader, Error> {
        if self.payload_len > MAX_PACKET_PAYLOAD_LEN {
            return Err(Error::PayloadTooLong);
        }
        let this = PacketHeader {
            len: (PACKET_HEADER_LEN + self.payload_len) as u8,
            dest: self.dest,
            src: self.src,
        };
        this.check_rep();
        Ok(this)
    }
}

#[derive(Debug)]
pub enum Error {
    Decoding { field: &'static str },
    PayloadTooLong,
    NotEnoughSpace,
}

impl PacketHeader {
    #[inline]
    fn check_rep(&self) {
        assert!(PACKET_HEADER_LEN <= self.len as usize);
        assert!(self.len as usize <= MAX_PACKET_LEN);
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, Error> {
        let len = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "len" })?;
        if (len as usize) < PACKET_HEADER_LEN || MAX_PACKET_LEN < len as usize {
            return Err(Error::Decoding { field: "len" });
        }
        let dest = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "dest" })?;
        let src = rdr
            .read_u8()
            .map_err(|_e| Error::Decoding { field: "src" })?;

        let this = PacketHeader { len, dest, src };
        this.check_rep();
        Ok(this)
    }

    pub fn write_to(&self, wtr: &mut io::Cursor<&mut [u8]>) -> Result<(), Error> {
        wtr.write_u8(self.len).map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.dest)
            .map_err(|_e| Error::NotEnoughSpace)?;
        wtr.write_u8(self.src).map_err(|_e| Error::NotEnoughSpace)?;
        Ok(())
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.len as usize - PACKET_HEADER_LEN
    }

    #[must_use]
    #[inline]
    pub fn dest(&self) -> u8 {
        self.dest
    }

    #[must_use]
    #[inline]
    pub fn src(&self) -> u8 {
        self.src
    }
}
