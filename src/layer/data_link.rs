use crate::protocol::frame::{self, MAX_FRAME_PAYLOAD_LEN};
use crate::trx::{ReceiveError, Timeout, Transceiver, TRX_PAYLOAD_LENGTH};

/// Framing over the transceiver. No retry, no interpretation of the body;
/// a timeout is a normal outcome and is propagated as such.
pub struct DataLink<T> {
    trx: T,
}

#[derive(Debug)]
pub enum TxError {
    PayloadTooLong,
    Device,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RxError {
    Timeout,
    Device,
}

impl<T: Transceiver> DataLink<T> {
    pub fn new(trx: T) -> Self {
        DataLink { trx }
    }

    pub fn tx(&mut self, payload: &[u8], dl_addr: u32) -> Result<(), TxError> {
        let frame = frame::build(payload).map_err(|_e| TxError::PayloadTooLong)?;
        self.trx
            .transmit(dl_addr, &frame)
            .map_err(|_e| TxError::Device)
    }

    pub fn rx(&mut self, buf: &mut [u8], timeout: Timeout) -> Result<usize, RxError> {
        let mut raw = [0u8; TRX_PAYLOAD_LENGTH];
        self.trx.receive(&mut raw, timeout).map_err(|e| match e {
            ReceiveError::Timeout => RxError::Timeout,
            ReceiveError::Device => RxError::Device,
        })?;
        let n = buf.len().min(MAX_FRAME_PAYLOAD_LEN);
        buf[..n].copy_from_slice(&frame::body(&raw)[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockTrx;

    #[test]
    fn tx_builds_padded_frame() {
        let mut trx = MockTrx::quiet();
        let mut link = DataLink::new(&mut trx);
        link.tx(&[0xDE, 0xAD], 0xA000_000B).unwrap();

        assert_eq!(trx.sent.len(), 1);
        let (addr, frame) = &trx.sent[0];
        assert_eq!(*addr, 0xA000_000B);
        assert_eq!(frame[0], 2);
        assert_eq!(&frame[1..3], &[0xDE, 0xAD]);
        assert!(frame[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn tx_rejects_oversize_payload() {
        let mut trx = MockTrx::quiet();
        let mut link = DataLink::new(&mut trx);
        let payload = [0u8; MAX_FRAME_PAYLOAD_LEN + 1];
        assert!(matches!(
            link.tx(&payload, 1),
            Err(TxError::PayloadTooLong)
        ));
        assert!(trx.sent.is_empty());
    }

    #[test]
    fn rx_copies_frame_body() {
        let mut raw = [0u8; TRX_PAYLOAD_LENGTH];
        raw[0] = 3;
        raw[1..4].copy_from_slice(&[9, 8, 7]);
        let mut trx = MockTrx::quiet();
        trx.push_frame(raw);

        let mut link = DataLink::new(&mut trx);
        let mut buf = [0u8; MAX_FRAME_PAYLOAD_LEN];
        let n = link.rx(&mut buf, Timeout::Millis(10)).unwrap();
        assert_eq!(n, MAX_FRAME_PAYLOAD_LEN);
        assert_eq!(&buf[..3], &[9, 8, 7]);
    }

    #[test]
    fn rx_propagates_timeout() {
        let mut trx = MockTrx::quiet();
        let mut link = DataLink::new(&mut trx);
        let mut buf = [0u8; MAX_FRAME_PAYLOAD_LEN];
        assert_eq!(link.rx(&mut buf, Timeout::Millis(10)), Err(RxError::Timeout));
    }
}
