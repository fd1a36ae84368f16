//! Bit-packed message buffer.
//!
//! [`MessageBuffer`] is the typed façade over the primitives in
//! [`crate::bits`]: writes append at `bit_length`, reads consume from
//! `read_position`, both measured in bits. The buffer preserves the order
//! of writes within itself but attaches no meaning to the bytes: reads
//! must mirror the write order, and a mismatched sequence yields
//! well-formed but wrong values or [`CodecError::ReadOverflow`].

mod read;
mod write;

pub use write::{bits_to_hold_u32, bits_to_hold_u64};

use crate::error::{CodecError, Result};

/// Growable byte buffer addressed at bit granularity.
///
/// Created empty, pre-sized, or wrapping bytes received from the wire.
/// Storage grows by doubling and never shrinks implicitly; a write that
/// straddles the current end finds the trailing bits of the final byte
/// zeroed.
#[derive(Debug, Default, Clone)]
pub struct MessageBuffer {
    data: Vec<u8>,
    /// Count of meaningful bits in `data`.
    bit_length: usize,
    /// Read cursor, in bits.
    read_position: usize,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the backing storage to `bytes` zeroed bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: vec![0; bytes],
            bit_length: 0,
            read_position: 0,
        }
    }

    /// Wraps bytes deposited by the socket reader; every bit becomes
    /// readable.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let bit_length = data.len() * 8;
        Self {
            data,
            bit_length,
            read_position: 0,
        }
    }

    /// The written bytes, including a final partial byte when
    /// `bit_length` is not a multiple of eight.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.bit_length.div_ceil(8)]
    }

    /// Consumes the buffer, returning the backing storage (for example to
    /// recycle it into an [`crate::pool::ArrayPool`]).
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Written length rounded up to whole bytes.
    pub fn byte_length(&self) -> usize {
        self.bit_length.div_ceil(8)
    }

    pub fn read_position(&self) -> usize {
        self.read_position
    }

    /// Bits left between the read cursor and the end of the data.
    pub fn remaining_bits(&self) -> usize {
        self.bit_length.saturating_sub(self.read_position)
    }

    /// Moves the read cursor to an absolute bit position.
    pub fn seek(&mut self, bit_position: usize) {
        assert!(
            bit_position <= self.bit_length,
            "seek past the end of the buffer"
        );
        self.read_position = bit_position;
    }

    /// Advances the read cursor by exactly `bits`.
    pub fn skip_bits(&mut self, bits: usize) -> Result<()> {
        self.check_read(bits)?;
        self.read_position += bits;
        Ok(())
    }

    /// Rounds the read cursor up to the next byte boundary. Idempotent.
    pub fn read_pad_bits(&mut self) {
        self.read_position = self.read_position.div_ceil(8) * 8;
    }

    /// Rounds `bit_length` up to the next byte boundary; the padding bits
    /// are zero.
    pub fn write_pad_bits(&mut self) {
        let padded = self.bit_length.div_ceil(8) * 8;
        self.ensure_bits(padded - self.bit_length);
        self.bit_length = padded;
    }

    /// Empties the buffer for reuse. Storage is retained and zeroed so
    /// later straddling writes still find clean trailing bits.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.bit_length = 0;
        self.read_position = 0;
    }

    /// Grows the backing storage so `bits` more bits fit at the write
    /// cursor. Doubles on growth, never shrinks.
    pub(crate) fn ensure_bits(&mut self, bits: usize) {
        let needed = (self.bit_length + bits).div_ceil(8);
        if needed > self.data.len() {
            let grown = needed.max(self.data.len() * 2);
            self.data.resize(grown, 0);
        }
    }

    pub(crate) fn check_read(&self, bits: usize) -> Result<()> {
        if self.read_position + bits > self.bit_length {
            return Err(CodecError::ReadOverflow);
        }
        Ok(())
    }
}
