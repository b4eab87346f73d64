/// The 1-bit alternating sequence number of the stop-and-wait transport.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SeqBit {
    n: u8,
}

impl SeqBit {
    pub const ZERO: SeqBit = SeqBit { n: 0 };
    pub const ONE: SeqBit = SeqBit { n: 1 };

    pub fn try_from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(SeqBit::ZERO),
            1 => Some(SeqBit::ONE),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub fn to_u8(&self) -> u8 {
        self.n
    }

    pub fn toggle(&mut self) {
        *self = self.complement();
    }

    #[must_use]
    pub fn complement(&self) -> SeqBit {
        match self.n {
            0 => SeqBit::ONE,
            _ => SeqBit::ZERO,
        }
    }
}
