//! A miniature layered network stack for small "cube" nodes that exchange
//! variable-length messages over a short-range packet radio with fixed
//! 32-byte payloads.
//!
//! Bottom-up: a data-link layer frames one packet per radio payload, a
//! network layer forwards hop by hop over a static next-hop table, and a
//! stop-and-wait transport segments, reassembles, and acknowledges whole
//! messages. See [`protocol`] for the wire formats.
//!
//! The radio itself is a [`trx::Transceiver`] implementation supplied by
//! the platform; protocol delays go through [`clock::Clock`] so tests can
//! run without real time.

pub mod addr;
pub mod clock;
pub mod layer;
pub mod protocol;
pub mod trx;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_util;
