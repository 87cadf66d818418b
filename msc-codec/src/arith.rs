//! Adaptive binary arithmetic coder.
//!
//! A 16-bit integer coder in the classic low/high/underflow formulation.
//! The interval `[low, high]` is narrowed by each symbol's count range and
//! renormalized whenever the top bits agree (E1/E2, bit shifted out) or the
//! interval straddles the midpoint too tightly (E3, bit deferred as
//! underflow). The decoder tracks the same registers plus a 16-bit `code`
//! window into the stream, so both sides must see identical model state for
//! every symbol.

use crate::error::{MscError, Result};
use crate::model::FrequencyModel;
use msc_core::bitstream::{BitReader, BitWriter};

/// Width of the coder registers in bits.
pub const CODE_BITS: u32 = 16;

const TOP_BIT: u16 = 0x8000;
const SECOND_BIT: u16 = 0x4000;
const LOW_MASK: u16 = 0x3FFF;

/// A symbol's slice of its model: `[low_count, high_count)` out of `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Cumulative count below the symbol.
    pub low_count: u16,
    /// Cumulative count through the symbol.
    pub high_count: u16,
    /// Model total.
    pub scale: u16,
}

/// Arithmetic encoder state.
#[derive(Debug, Clone)]
pub struct ArithmeticEncoder {
    low: u16,
    high: u16,
    underflow_bits: u32,
}

impl ArithmeticEncoder {
    /// Create an encoder covering the full interval.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: 0xFFFF,
            underflow_bits: 0,
        }
    }

    /// Narrow the interval to `symbol` and shift out settled bits.
    pub fn encode_symbol(&mut self, writer: &mut BitWriter, symbol: &Symbol) {
        debug_assert!(symbol.low_count < symbol.high_count);
        debug_assert!(symbol.high_count <= symbol.scale);

        let range = (self.high - self.low) as u32 + 1;
        let scale = symbol.scale as u32;
        self.high = (self.low as u32 + range * symbol.high_count as u32 / scale - 1) as u16;
        self.low = (self.low as u32 + range * symbol.low_count as u32 / scale) as u16;

        loop {
            if (self.high & TOP_BIT) == (self.low & TOP_BIT) {
                let bit = self.high & TOP_BIT != 0;
                writer.write_bit(bit);
                while self.underflow_bits > 0 {
                    writer.write_bit(!bit);
                    self.underflow_bits -= 1;
                }
            } else if (self.low & SECOND_BIT) != 0 && (self.high & SECOND_BIT) == 0 {
                self.underflow_bits += 1;
                self.low &= LOW_MASK;
                self.high |= SECOND_BIT;
            } else {
                return;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
    }

    /// Code `symbol` with `model`, then count it.
    #[inline]
    pub fn encode(&mut self, writer: &mut BitWriter, model: &mut FrequencyModel, symbol: usize) {
        let range = model.symbol(symbol);
        self.encode_symbol(writer, &range);
        model.update(symbol);
    }

    /// Terminate the stream.
    ///
    /// Emits the second most significant bit of `low` followed by enough
    /// complement bits to place the decoder inside the final interval, then
    /// pads to a byte boundary. Returns the total bytes in `writer`.
    pub fn flush(&mut self, writer: &mut BitWriter) -> usize {
        let bit = self.low & SECOND_BIT != 0;
        writer.write_bit(bit);
        self.underflow_bits += 1;
        while self.underflow_bits > 0 {
            writer.write_bit(!bit);
            self.underflow_bits -= 1;
        }
        writer.flush()
    }
}

impl Default for ArithmeticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic decoder state.
#[derive(Debug, Clone)]
pub struct ArithmeticDecoder {
    low: u16,
    high: u16,
    code: u16,
    /// Zero bits shifted in after the payload ran out.
    overrun: u32,
}

impl ArithmeticDecoder {
    /// Prime the code register with the first 16 bits of the payload.
    pub fn new(reader: &mut BitReader<'_>) -> Result<Self> {
        let mut decoder = Self {
            low: 0,
            high: 0xFFFF,
            code: 0,
            overrun: 0,
        };
        for _ in 0..CODE_BITS {
            decoder.code = (decoder.code << 1) | decoder.next_bit(reader)?;
        }
        Ok(decoder)
    }

    /// Next payload bit, or zero for at most [`CODE_BITS`] bits past the end.
    ///
    /// A well-formed payload never needs more lookahead than the register
    /// width, so anything beyond that is corruption.
    fn next_bit(&mut self, reader: &mut BitReader<'_>) -> Result<u16> {
        if reader.is_eof() {
            self.overrun += 1;
            if self.overrun > CODE_BITS {
                return Err(MscError::corrupt(format!(
                    "arithmetic payload exhausted after {} bits",
                    reader.total_bits()
                )));
            }
            return Ok(0);
        }
        Ok(reader.read_bit()? as u16)
    }

    /// The count within `[0, scale)` that `code` currently points at.
    pub fn current_count(&self, scale: u16) -> Result<u16> {
        let range = (self.high - self.low) as u32 + 1;
        let offset = self.code.wrapping_sub(self.low) as u32;
        let count = ((offset + 1) * scale as u32 - 1) / range;
        if count >= scale as u32 {
            return Err(MscError::corrupt(format!(
                "count {} outside model scale {}",
                count, scale
            )));
        }
        Ok(count as u16)
    }

    /// Narrow the interval to `symbol` and shift in fresh payload bits.
    pub fn remove_symbol_from_stream(
        &mut self,
        reader: &mut BitReader<'_>,
        symbol: &Symbol,
    ) -> Result<()> {
        let range = (self.high - self.low) as u32 + 1;
        let scale = symbol.scale as u32;
        self.high = (self.low as u32 + range * symbol.high_count as u32 / scale - 1) as u16;
        self.low = (self.low as u32 + range * symbol.low_count as u32 / scale) as u16;

        loop {
            if (self.high & TOP_BIT) == (self.low & TOP_BIT) {
                // E1/E2: the settled bit simply shifts out.
            } else if (self.low & SECOND_BIT) != 0 && (self.high & SECOND_BIT) == 0 {
                self.code ^= SECOND_BIT;
                self.low &= LOW_MASK;
                self.high |= SECOND_BIT;
            } else {
                return Ok(());
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | self.next_bit(reader)?;
        }
    }

    /// Decode one symbol of `model`, then count it.
    pub fn decode(&mut self, reader: &mut BitReader<'_>, model: &mut FrequencyModel) -> Result<usize> {
        let count = self.current_count(model.scale())?;
        let (symbol, range) = model.find(count).ok_or_else(|| {
            MscError::corrupt(format!(
                "count {} maps to no symbol of a {}-bit model",
                count,
                model.bits()
            ))
        })?;
        self.remove_symbol_from_stream(reader, &range)?;
        model.update(symbol);
        Ok(symbol)
    }
}
