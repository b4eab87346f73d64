use crate::trx::TRX_PAYLOAD_LENGTH;

pub const FRAME_HEADER_LEN: usize = 1;
pub const MAX_FRAME_PAYLOAD_LEN: usize = TRX_PAYLOAD_LENGTH - FRAME_HEADER_LEN;

#[derive(Debug)]
pub enum Error {
    PayloadTooLong,
}

/// Builds a radio payload: length byte, frame body, zero padding.
/// The length byte counts the body only, itself excluded.
pub fn build(payload: &[u8]) -> Result<[u8; TRX_PAYLOAD_LENGTH], Error> {
    if payload.len() > MAX_FRAME_PAYLOAD_LEN {
        return Err(Error::PayloadTooLong);
    }
    let mut frame = [0u8; TRX_PAYLOAD_LENGTH];
    frame[0] = payload.len() as u8;
    frame[FRAME_HEADER_LEN..FRAME_HEADER_LEN + payload.len()].copy_from_slice(payload);
    Ok(frame)
}

/// The frame body. The receive path does not trust the frame length byte;
/// the packet inside carries its own.
#[must_use]
#[inline]
pub fn body(raw: &[u8; TRX_PAYLOAD_LENGTH]) -> &[u8] {
    &raw[FRAME_HEADER_LEN..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_pads_with_zeros() {
        let frame = build(&[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(frame[0], 3);
        assert_eq!(&frame[1..4], &[0xAA, 0xBB, 0xCC]);
        assert!(frame[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn build_full_payload() {
        let payload = [7u8; MAX_FRAME_PAYLOAD_LEN];
        let frame = build(&payload).unwrap();
        assert_eq!(frame[0], MAX_FRAME_PAYLOAD_LEN as u8);
        assert_eq!(&frame[1..], &payload[..]);
    }

    #[test]
    fn build_rejects_oversize() {
        let payload = [0u8; MAX_FRAME_PAYLOAD_LEN + 1];
        assert!(build(&payload).is_err());
    }

    #[test]
    fn body_skips_length_byte() {
        let frame = build(&[1, 2]).unwrap();
        assert_eq!(body(&frame)[..2], [1, 2]);
        assert_eq!(body(&frame).len(), MAX_FRAME_PAYLOAD_LEN);
    }
}
