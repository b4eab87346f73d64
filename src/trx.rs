//! Transceiver seam. The real radio driver lives outside this crate; the
//! stack only relies on addressed fixed-length payload transmit and a timed
//! blocking receive.

/// The length of payloads transmitted and received by the transceiver.
pub const TRX_PAYLOAD_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Millis(u16),
    /// Disables the receive timer.
    Indefinite,
}

#[derive(Debug)]
pub enum TransmitError {
    Device,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReceiveError {
    Timeout,
    Device,
}

pub trait Transceiver {
    fn transmit(
        &mut self,
        addr: u32,
        payload: &[u8; TRX_PAYLOAD_LENGTH],
    ) -> Result<(), TransmitError>;

    fn receive(
        &mut self,
        out: &mut [u8; TRX_PAYLOAD_LENGTH],
        timeout: Timeout,
    ) -> Result<(), ReceiveError>;
}

impl<T: Transceiver + ?Sized> Transceiver for &mut T {
    fn transmit(
        &mut self,
        addr: u32,
        payload: &[u8; TRX_PAYLOAD_LENGTH],
    ) -> Result<(), TransmitError> {
        (**self).transmit(addr, payload)
    }

    fn receive(
        &mut self,
        out: &mut [u8; TRX_PAYLOAD_LENGTH],
        timeout: Timeout,
    ) -> Result<(), ReceiveError> {
        (**self).receive(out, timeout)
    }
}
