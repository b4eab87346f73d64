//! # Frame (data link)
//!
//! ```text
//! 0   1                           32 (BYTE)
//! +---+---------------------------+
//! |len|    packet, zero-padded    |
//! +---+---------------------------+
//! ```
//!
//! # Packet (network)
//!
//! ```text
//! 0   1   2   3                     (BYTE)
//! +---+---+---+-------------------+
//! |len|dst|src|      segment      |
//! +---+---+---+-------------------+
//! ```
//!
//! # Segment (transport)
//!
//! ```text
//! 0   1   2   3   4   5       7     (BYTE)
//! +---+---+---+---+---+-------+
//! |len|seq|dst|src| id|  u16  |
//! +---+---+---+---+---+-------+---+
//! |                               |
//! |        payload (DATA)         |
//! |                               |
//! +-------------------------------+
//! ```
//!
//! The 16-bit field is big-endian: total message length for
//! START_OF_MESSAGE, payload offset for DATA, absent for END_OF_MESSAGE
//! and ACK (their headers stop at byte 5).
//!
//! # Invariants
//!
//! - a segment fits in one packet fits in one radio payload
//! - `seq` is 0 or 1
//! - `len` covers the header, payload included for DATA

pub mod frame;
pub mod packet_hdr;
pub mod segment_hdr;
