//! Bit level reading and writing of code fields.
//!
//! Bytes are filled from the most significant bit. Every field of the format is transmitted in
//! reversed order, that is its least significant bit is the first to enter the stream, so the
//! codec only ever calls [`BitSink::write_reversed_bits`] and [`BitSource::read_reversed_bits`].
use crate::error::{LzError, Result};
use crate::Code;

use std::mem;

/// Reverse the order of the low `len` bits of `value`.
///
/// Bits above `len` are discarded. This is its own inverse for values that fit into `len` bits.
pub fn reverse_bits(value: Code, len: u8) -> Code {
    if len == 0 {
        0
    } else {
        value.reverse_bits() >> (32 - u32::from(len))
    }
}

/// Accumulates fields into a growing byte buffer.
#[derive(Debug, Default)]
pub struct BitSink {
    /// Completed bytes not yet handed out.
    bytes: Vec<u8>,
    /// The buffer bits, aligned to the most significant bit.
    buffer: u64,
    /// The number of valid buffer bits, always below 8 between calls.
    bits_in_buffer: u8,
}

/// Reads fields from a byte slice.
#[derive(Debug, Clone)]
pub struct BitSource<'a> {
    bytes: &'a [u8],
    /// Position of the next bit, counted from the start of `bytes`.
    position: usize,
}

impl BitSink {
    pub fn new() -> Self {
        BitSink::default()
    }

    /// Append the low `len` bits of `value`, most significant first.
    ///
    /// Fields are at most 32 bits wide. A length of zero writes nothing.
    pub fn write_bits(&mut self, value: Code, len: u8) {
        debug_assert!(len <= 32);
        if len == 0 {
            return;
        }

        let value = u64::from(value) & ((1u64 << len) - 1);
        let shift = 64 - self.bits_in_buffer - len;
        self.buffer |= value << shift;
        self.bits_in_buffer += len;
        self.push_out();
    }

    /// Append the low `len` bits of `value`, least significant first.
    pub fn write_reversed_bits(&mut self, value: Code, len: u8) {
        self.write_bits(reverse_bits(value, len), len);
    }

    /// Remove all completed bytes from the sink.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        mem::take(&mut self.bytes)
    }

    /// Number of bits written since the last `finish`, counting bytes already taken out.
    pub fn pending_bits(&self) -> usize {
        self.bytes.len() * 8 + usize::from(self.bits_in_buffer)
    }

    /// Pad the last byte with zeros and return all bytes not yet taken.
    ///
    /// The trailing partial byte is emitted even if it holds no bits at all, so a stream that
    /// ends on a byte boundary gains one zero byte. Readers of the format expect this.
    pub fn finish(&mut self) -> Vec<u8> {
        self.bytes.push((self.buffer >> 56) as u8);
        self.buffer = 0;
        self.bits_in_buffer = 0;
        mem::take(&mut self.bytes)
    }

    fn push_out(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.bytes.push((self.buffer >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }
}

impl<'a> BitSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitSource { bytes, position: 0 }
    }

    /// The number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }

    /// Read the next `n` bits, most significant first, right aligned in the result.
    ///
    /// Fails with [`LzError::EndOfStream`] when nothing is left at all and with
    /// [`LzError::TruncatedStream`] when some, but fewer than `n`, bits remain. In the latter case
    /// the rest of the input is consumed.
    pub fn read_bits(&mut self, n: u8) -> Result<Code> {
        debug_assert!(n <= 32);
        let remaining = self.remaining();
        if remaining == 0 {
            return Err(LzError::EndOfStream);
        }
        if remaining < usize::from(n) {
            self.position = self.bytes.len() * 8;
            return Err(LzError::TruncatedStream);
        }

        let mut value: Code = 0;
        let mut n = n;
        while n > 0 {
            let byte = self.bytes[self.position / 8];
            let offset = (self.position % 8) as u8;
            let k = (8 - offset).min(n);
            let chunk = (byte << offset) >> (8 - k);
            value = (value << k) | Code::from(chunk);
            self.position += usize::from(k);
            n -= k;
        }

        Ok(value)
    }

    /// Read a field of `n` bits transmitted least significant bit first.
    pub fn read_reversed_bits(&mut self, n: u8) -> Result<Code> {
        self.read_bits(n).map(|bits| reverse_bits(bits, n))
    }
}

#[cfg(test)]
mod tests {
    use super::{reverse_bits, BitSink, BitSource};
    use crate::error::LzError;

    #[test]
    fn reverse_low_bits_only() {
        assert_eq!(reverse_bits(0b001, 3), 0b100);
        assert_eq!(reverse_bits(0b110, 3), 0b011);
        assert_eq!(reverse_bits(0xff01, 8), 0x80);
        assert_eq!(reverse_bits(1, 32), 0x8000_0000);
        assert_eq!(reverse_bits(0xffff, 0), 0);
    }

    #[test]
    fn natural_writes_cross_bytes() {
        let mut sink = BitSink::new();
        sink.write_bits(0b101, 3);
        sink.write_bits(0b1_1110_0001, 9);
        sink.write_bits(0, 0);
        assert_eq!(sink.pending_bits(), 12);
        assert_eq!(sink.finish(), [0b1011_1110, 0b0001_0000]);
    }

    #[test]
    fn reversed_write_emits_low_bit_first() {
        let mut sink = BitSink::new();
        sink.write_reversed_bits(2, 2);
        sink.write_reversed_bits(b'a'.into(), 8);
        // 01 followed by 10000110
        assert_eq!(sink.finish(), [0b0110_0001, 0b1000_0000]);
    }

    #[test]
    fn aligned_stream_gets_trailing_byte() {
        let mut sink = BitSink::new();
        sink.write_bits(0xab, 8);
        assert_eq!(sink.finish(), [0xab, 0]);
        // The sink is empty and usable again.
        assert_eq!(sink.finish(), [0]);
    }

    #[test]
    fn take_bytes_leaves_partial_byte() {
        let mut sink = BitSink::new();
        sink.write_bits(0xabc, 12);
        assert_eq!(sink.take_bytes(), [0xab]);
        assert!(sink.take_bytes().is_empty());
        assert_eq!(sink.finish(), [0xc0]);
    }

    #[test]
    fn read_inverts_natural_write() {
        let mut source = BitSource::new(&[0b1011_1110, 0b0001_0000]);
        assert_eq!(source.read_bits(3).unwrap(), 0b101);
        assert_eq!(source.read_bits(9).unwrap(), 0b1_1110_0001);
        assert_eq!(source.position(), 12);
        assert_eq!(source.remaining(), 4);
    }

    #[test]
    fn reversed_read_inverts_reversed_write() {
        let mut sink = BitSink::new();
        for (value, len) in [(1, 2), (0x3042, 16), (77, 7), (0x1_2345, 17)] {
            sink.write_reversed_bits(value, len);
        }
        let bytes = sink.finish();
        let mut source = BitSource::new(&bytes);
        for (value, len) in [(1, 2), (0x3042, 16), (77, 7), (0x1_2345, 17)] {
            assert_eq!(source.read_reversed_bits(len).unwrap(), value);
        }
    }

    #[test]
    fn exhaustion_kinds_are_distinct() {
        let mut source = BitSource::new(&[0xff]);
        assert_eq!(source.read_bits(6).unwrap(), 0x3f);
        assert!(matches!(source.read_bits(3), Err(LzError::TruncatedStream)));
        assert!(matches!(source.read_bits(1), Err(LzError::EndOfStream)));

        let mut source = BitSource::new(&[0xff]);
        assert_eq!(source.read_bits(8).unwrap(), 0xff);
        assert!(matches!(source.read_bits(2), Err(LzError::EndOfStream)));

        let mut empty = BitSource::new(&[]);
        assert!(matches!(empty.read_reversed_bits(2), Err(LzError::EndOfStream)));
    }
}
