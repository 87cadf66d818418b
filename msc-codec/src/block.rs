//! Per-block transform and entropy coding.
//!
//! A block travels pixels -> DCT -> quantize -> zigzag on the way in and
//! back again on the way out. In scan order it is coded as:
//!
//! 1. position of the last nonzero coefficient (6-bit model)
//! 2. coefficient model index, only when that position is nonzero
//! 3. DC level (11-bit model)
//! 4. AC levels `1..=last` with the selected coefficient model
//!
//! Every model is signed-offset so that levels map onto non-negative
//! symbols.

use crate::arith::{ArithmeticDecoder, ArithmeticEncoder};
use crate::dct::{forward_dct_2d, inverse_dct_2d};
use crate::error::{MscError, Result};
use crate::model::{coefficient_offset, ModelSet, DC_OFFSET, NUM_ARITH_MODELS};
use crate::quant::QuantMatrices;
use crate::tables::{inverse_zigzag_block, zigzag_block, BLOCK_COEFFS};
use msc_core::bitstream::{BitReader, BitWriter};

/// An 8x8 block of samples or levels.
pub type Block = [i16; BLOCK_COEFFS];

/// Smallest coefficient model whose range holds `max_abs`.
///
/// Model `i` covers magnitudes below `2^(i+1)`: <2, <4, ... <1024.
pub fn get_arith_model_index(max_abs: u16) -> usize {
    (0..NUM_ARITH_MODELS)
        .find(|&i| (max_abs as u32) < (1 << (i + 1)))
        .unwrap_or(NUM_ARITH_MODELS - 1)
}

/// Scan index of the last nonzero level, or 0 when only DC can be nonzero.
pub fn last_nonzero(scanned: &Block) -> usize {
    scanned.iter().rposition(|&c| c != 0).unwrap_or(0)
}

/// Transform, quantize and scan a block of samples (or differences).
///
/// Returns the pre-clip level when quantization had to clip.
pub fn transform_block(
    samples: &Block,
    quant: &QuantMatrices,
    intra: bool,
    scanned: &mut Block,
) -> Option<i64> {
    let mut coeffs = [0i32; BLOCK_COEFFS];
    let mut levels = [0i16; BLOCK_COEFFS];
    forward_dct_2d(samples, &mut coeffs);
    let clipped = quant.quantize(&coeffs, intra, &mut levels);
    *scanned = zigzag_block(&levels);
    clipped
}

/// Invert [`transform_block`]: unscan, dequantize and inverse transform.
pub fn reconstruct_block(scanned: &Block, quant: &QuantMatrices, intra: bool, samples: &mut Block) {
    let levels = inverse_zigzag_block(scanned);
    let mut coeffs = [0i32; BLOCK_COEFFS];
    quant.dequantize(&levels, intra, &mut coeffs);
    inverse_dct_2d(&coeffs, samples);
}

/// Entropy-code one block of scanned levels.
pub fn encode_block(
    encoder: &mut ArithmeticEncoder,
    writer: &mut BitWriter,
    models: &mut ModelSet,
    scanned: &Block,
) {
    let last = last_nonzero(scanned);
    debug_assert!(last < BLOCK_COEFFS);
    encoder.encode(writer, &mut models.last_position, last);

    let mut model = 0;
    if last > 0 {
        let max_abs = scanned[1..=last]
            .iter()
            .map(|c| c.unsigned_abs())
            .max()
            .unwrap_or(0);
        model = get_arith_model_index(max_abs);
        encoder.encode(writer, &mut models.model_index, model);
    }

    let dc = scanned[0] as i32 + DC_OFFSET;
    debug_assert!(dc >= 0 && (dc as usize) < models.dc.len());
    encoder.encode(writer, &mut models.dc, dc as usize);

    let offset = coefficient_offset(model);
    for &level in &scanned[1..=last] {
        let symbol = level as i32 + offset;
        encoder.encode(writer, &mut models.coefficients[model], symbol as usize);
    }
}

/// Decode one block of scanned levels.
pub fn decode_block(
    decoder: &mut ArithmeticDecoder,
    reader: &mut BitReader<'_>,
    models: &mut ModelSet,
    scanned: &mut Block,
) -> Result<()> {
    scanned.fill(0);

    let last = decoder.decode(reader, &mut models.last_position)?;

    let mut model = 0;
    if last > 0 {
        model = decoder.decode(reader, &mut models.model_index)?;
        if model >= NUM_ARITH_MODELS {
            return Err(MscError::corrupt(format!(
                "coefficient model index {} out of range",
                model
            )));
        }
    }

    scanned[0] = (decoder.decode(reader, &mut models.dc)? as i32 - DC_OFFSET) as i16;

    let offset = coefficient_offset(model);
    for level in &mut scanned[1..=last] {
        let symbol = decoder.decode(reader, &mut models.coefficients[model])?;
        *level = (symbol as i32 - offset) as i16;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ZIGZAG_SCAN;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_model_index_buckets() {
        assert_eq!(get_arith_model_index(0), 0);
        assert_eq!(get_arith_model_index(1), 0);
        assert_eq!(get_arith_model_index(2), 1);
        assert_eq!(get_arith_model_index(3), 1);
        assert_eq!(get_arith_model_index(4), 2);
        assert_eq!(get_arith_model_index(511), 8);
        assert_eq!(get_arith_model_index(512), 9);
        assert_eq!(get_arith_model_index(1023), 9);
    }

    #[test]
    fn test_last_nonzero() {
        let mut scanned = [0i16; BLOCK_COEFFS];
        assert_eq!(last_nonzero(&scanned), 0);
        scanned[0] = 5;
        assert_eq!(last_nonzero(&scanned), 0);
        scanned[17] = -1;
        assert_eq!(last_nonzero(&scanned), 17);
        scanned[63] = 2;
        assert_eq!(last_nonzero(&scanned), 63);
    }

    #[test]
    fn test_gray_block_is_dc_only() {
        let quant = QuantMatrices::new(8);
        let samples = [128i16; BLOCK_COEFFS];
        let mut scanned = [0i16; BLOCK_COEFFS];
        assert!(transform_block(&samples, &quant, true, &mut scanned).is_none());
        assert_eq!(scanned[0], 128);
        assert_eq!(last_nonzero(&scanned), 0);

        let mut restored = [0i16; BLOCK_COEFFS];
        reconstruct_block(&scanned, &quant, true, &mut restored);
        assert_eq!(restored, samples);
    }

    #[test]
    fn test_gray_block_decodes_dc_only() {
        let quant = QuantMatrices::new(8);
        let mut scanned = [0i16; BLOCK_COEFFS];
        transform_block(&[128i16; BLOCK_COEFFS], &quant, true, &mut scanned);

        let mut models = ModelSet::new();
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        encode_block(&mut encoder, &mut writer, &mut models, &scanned);
        encoder.flush(&mut writer);

        let mut models = ModelSet::new();
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        let mut decoded = [7i16; BLOCK_COEFFS];
        decode_block(&mut decoder, &mut reader, &mut models, &mut decoded).unwrap();

        let mut expected = [0i16; BLOCK_COEFFS];
        expected[0] = 128;
        assert_eq!(decoded, expected);
        assert_eq!(last_nonzero(&decoded), 0);
        // Only the last-position model saw a symbol, and it was position 0.
        let position = models.last_position.symbol(0);
        assert_eq!(position.high_count - position.low_count, 2);
        assert_eq!(models.model_index.scale(), 17);

        let mut restored = [0i16; BLOCK_COEFFS];
        reconstruct_block(&decoded, &quant, true, &mut restored);
        assert_eq!(restored, [128i16; BLOCK_COEFFS]);
    }

    fn roundtrip(blocks: &[Block]) -> Vec<Block> {
        let mut models = ModelSet::new();
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        for block in blocks {
            encode_block(&mut encoder, &mut writer, &mut models, block);
        }
        encoder.flush(&mut writer);

        let mut models = ModelSet::new();
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        blocks
            .iter()
            .map(|_| {
                let mut out = [0i16; BLOCK_COEFFS];
                decode_block(&mut decoder, &mut reader, &mut models, &mut out).unwrap();
                out
            })
            .collect()
    }

    #[test]
    fn test_entropy_roundtrip() {
        let mut blocks = Vec::new();
        blocks.push([0i16; BLOCK_COEFFS]);

        let mut dc_only = [0i16; BLOCK_COEFFS];
        dc_only[0] = -1023;
        blocks.push(dc_only);

        let mut sparse = [0i16; BLOCK_COEFFS];
        sparse[0] = 1024;
        sparse[3] = -1;
        sparse[9] = 1;
        blocks.push(sparse);

        let mut dense = [0i16; BLOCK_COEFFS];
        for (i, c) in dense.iter_mut().enumerate() {
            *c = ((i as i16 * 97) % 2047) - 1023;
        }
        blocks.push(dense);

        let mut ramp = [0i16; BLOCK_COEFFS];
        for (i, c) in ramp.iter_mut().enumerate() {
            *c = (i as i16 % 9) - 4;
        }
        blocks.push(ramp);

        assert_eq!(roundtrip(&blocks), blocks);
    }

    #[test]
    fn test_decode_rejects_model_index_out_of_range() {
        // Hand-build a stream whose model index decodes to 12.
        let mut models = ModelSet::new();
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        encoder.encode(&mut writer, &mut models.last_position, 5);
        encoder.encode(&mut writer, &mut models.model_index, 12);
        encoder.encode(&mut writer, &mut models.dc, 0);
        encoder.flush(&mut writer);

        let mut models = ModelSet::new();
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        let mut out = [0i16; BLOCK_COEFFS];
        let err = decode_block(&mut decoder, &mut reader, &mut models, &mut out).unwrap_err();
        assert!(matches!(err, MscError::CorruptStream(_)));
    }

    #[test]
    fn test_scan_places_low_frequencies_first() {
        let quant = QuantMatrices::new(4);
        let mut samples = [0i16; BLOCK_COEFFS];
        for (i, s) in samples.iter_mut().enumerate() {
            *s = if i % 8 < 4 { 200 } else { 50 };
        }
        let mut scanned = [0i16; BLOCK_COEFFS];
        transform_block(&samples, &quant, true, &mut scanned);
        // Left and right halves only excite the first row of frequencies.
        for (k, &pos) in ZIGZAG_SCAN.iter().enumerate() {
            if pos >= 8 {
                assert_eq!(scanned[k], 0, "scan index {k}");
            }
        }
        assert!(scanned[1] > 0);
    }
}
