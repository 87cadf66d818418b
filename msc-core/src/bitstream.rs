//! Bitstream reading and writing utilities.
//!
//! Bits are packed MSB-first. The reader is bounded by an explicit bit length
//! so a truncated or corrupt payload surfaces as an error instead of a read
//! past the end of the buffer.

use crate::error::{BitstreamError, Result};

/// A bitstream reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader covering the whole byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_len: data.len() * 8,
            pos: 0,
        }
    }

    /// Create a bit reader limited to the first `bit_len` bits of `data`.
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Result<Self> {
        if bit_len > data.len() * 8 {
            return Err(BitstreamError::InvalidLength {
                bits: bit_len,
                bytes: data.len(),
            }
            .into());
        }
        Ok(Self {
            data,
            bit_len,
            pos: 0,
        })
    }

    /// Get the total number of readable bits.
    pub fn total_bits(&self) -> usize {
        self.bit_len
    }

    /// Get the current bit position in the stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the number of remaining bits.
    pub fn remaining_bits(&self) -> usize {
        self.bit_len - self.pos
    }

    /// Check if every bit has been consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bit_len
    }

    /// Check if the stream is byte-aligned.
    pub fn is_byte_aligned(&self) -> bool {
        self.pos % 8 == 0
    }

    /// Skip to the next byte boundary, never past the end.
    pub fn align_to_byte(&mut self) {
        self.pos = ((self.pos + 7) & !7).min(self.bit_len);
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.pos >= self.bit_len {
            return Err(BitstreamError::UnexpectedEnd.into());
        }

        let bit = (self.data[self.pos >> 3] >> (7 - (self.pos & 7))) & 1;
        self.pos += 1;
        Ok(bit != 0)
    }

    /// Read up to 32 bits as an unsigned integer.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(crate::error::Error::InvalidParameter(
                "Cannot read more than 32 bits at once".into(),
            ));
        }
        if self.remaining_bits() < n as usize {
            return Err(BitstreamError::UnexpectedEnd.into());
        }

        let mut value: u32 = 0;
        for _ in 0..n {
            value = (value << 1) | (self.read_bit()? as u32);
        }

        Ok(value)
    }

    /// Read a byte-aligned unsigned 8-bit value.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Skip a number of bits.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining_bits() < n {
            return Err(BitstreamError::UnexpectedEnd.into());
        }
        self.pos += n;
        Ok(())
    }

    /// Peek at the next n bits without consuming them.
    pub fn peek_bits(&self, n: u8) -> Result<u32> {
        let mut clone = self.clone();
        clone.read_bits(n)
    }
}

/// A growable MSB-first bitstream writer.
///
/// The backing buffer is kept across [`BitWriter::clear`] calls so a codec
/// context can pre-size it once and reuse it for every frame.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_pos: u8,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new bit writer with capacity.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_pos: 0,
        }
    }

    /// Create a bit writer, reporting allocation failure instead of aborting.
    pub fn try_with_capacity(bytes: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes).map_err(|_| {
            crate::error::Error::out_of_memory(format!(
                "could not allocate {} byte output buffer",
                bytes
            ))
        })?;
        Ok(Self { data, bit_pos: 0 })
    }

    /// Get the current bit position.
    pub fn position(&self) -> usize {
        self.data.len() * 8 - (8 - self.bit_pos as usize) % 8
    }

    /// Check if the writer is byte-aligned.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_pos == 0 {
            self.data.push(0);
        }

        if bit {
            let idx = self.data.len() - 1;
            self.data[idx] |= 1 << (7 - self.bit_pos);
        }

        self.bit_pos = (self.bit_pos + 1) & 7;
    }

    /// Write the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, n: u8) {
        debug_assert!(n <= 32, "cannot write more than 32 bits at once");
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Pad with zero bits to the next byte boundary.
    ///
    /// Returns the total number of bytes written so far.
    pub fn flush(&mut self) -> usize {
        self.bit_pos = 0;
        self.data.len()
    }

    /// Discard written data, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
        self.bit_pos = 0;
    }

    /// Get the written data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Take the written data, consuming the writer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
