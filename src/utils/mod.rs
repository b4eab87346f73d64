mod seq_bit;

pub use seq_bit::*;
