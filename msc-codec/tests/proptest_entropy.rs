//! Property-based tests for the entropy coding layers.
//!
//! Covers the frequency model invariants, encoder/decoder synchrony of the
//! arithmetic coder across model widths, block coding, and RLE rows.

use msc_codec::arith::{ArithmeticDecoder, ArithmeticEncoder};
use msc_codec::block::{decode_block, encode_block, Block};
use msc_codec::model::{FrequencyModel, ModelSet, MAXIMUM_SCALE};
use msc_codec::rle::{decode_row, encode_row, RAW_FLAG};
use msc_core::bitstream::{BitReader, BitWriter};
use proptest::prelude::*;

fn assert_model_invariants(model: &FrequencyModel) -> Result<(), TestCaseError> {
    let totals = model.totals();
    for pair in totals.windows(2) {
        prop_assert!(pair[0] < pair[1], "totals not increasing: {:?}", pair);
    }
    prop_assert!(model.scale() <= MAXIMUM_SCALE);
    Ok(())
}

fn width_and_symbols(max_len: usize) -> impl Strategy<Value = (u32, Vec<usize>)> {
    (1u32..=10).prop_flat_map(move |bits| {
        (
            Just(bits),
            prop::collection::vec(0usize..(1usize << bits), 1..max_len),
        )
    })
}

// =============================================================================
// Frequency Model
// =============================================================================

proptest! {
    /// Totals stay strictly increasing and bounded after any update sequence.
    #[test]
    fn model_invariants_hold((bits, symbols) in width_and_symbols(3000)) {
        let mut model = FrequencyModel::new(bits);
        for &s in &symbols {
            model.update(s);
        }
        assert_model_invariants(&model)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Two back-to-back rescales keep every symbol range non-empty.
    #[test]
    fn repeated_rescale_keeps_invariants(bits in 1u32..=6, symbol in 0usize..2) {
        let mut model = FrequencyModel::new(bits);
        let mut rescales = 0;
        let mut previous = model.scale();
        while rescales < 2 {
            model.update(symbol);
            if model.scale() < previous {
                rescales += 1;
                assert_model_invariants(&model)?;
            }
            previous = model.scale();
        }
    }
}

proptest! {
    /// Every count below the scale maps back to the symbol that owns it.
    #[test]
    fn find_inverts_symbol((bits, symbols) in width_and_symbols(200)) {
        let mut model = FrequencyModel::new(bits);
        for &s in &symbols {
            model.update(s);
        }
        for &s in &symbols {
            let range = model.symbol(s);
            let (found, _) = model.find(range.low_count).unwrap();
            prop_assert_eq!(found, s);
            let (found, _) = model.find(range.high_count - 1).unwrap();
            prop_assert_eq!(found, s);
        }
    }
}

// =============================================================================
// Arithmetic Coder
// =============================================================================

proptest! {
    /// Encoding through a fresh model and decoding through an identical one
    /// reproduces the sequence, for every model width up to 10 bits.
    #[test]
    fn arithmetic_coder_synchrony((bits, symbols) in width_and_symbols(2000)) {
        let mut model = FrequencyModel::new(bits);
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        for &s in &symbols {
            encoder.encode(&mut writer, &mut model, s);
        }
        encoder.flush(&mut writer);

        let mut model = FrequencyModel::new(bits);
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        for (i, &expected) in symbols.iter().enumerate() {
            let decoded = decoder.decode(&mut reader, &mut model).unwrap();
            prop_assert_eq!(decoded, expected, "symbol {}", i);
        }
    }

    /// Several models interleaved on one coder stay in lockstep.
    #[test]
    fn interleaved_models_stay_in_sync(
        symbols in prop::collection::vec((0usize..3, 0usize..16), 1..1000)
    ) {
        let widths = [1u32, 4, 10];
        let mut models: Vec<FrequencyModel> = widths.iter().map(|&b| FrequencyModel::new(b)).collect();
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        for &(m, s) in &symbols {
            let s = s % models[m].len();
            encoder.encode(&mut writer, &mut models[m], s);
        }
        encoder.flush(&mut writer);

        let mut models: Vec<FrequencyModel> = widths.iter().map(|&b| FrequencyModel::new(b)).collect();
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        for &(m, s) in &symbols {
            let expected = s % models[m].len();
            prop_assert_eq!(decoder.decode(&mut reader, &mut models[m]).unwrap(), expected);
        }
    }

    /// Decoding arbitrary bytes either succeeds or fails cleanly.
    #[test]
    fn arbitrary_payload_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut model = FrequencyModel::new(6);
        let mut reader = BitReader::new(&data);
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        for _ in 0..256 {
            if decoder.decode(&mut reader, &mut model).is_err() {
                break;
            }
        }
    }
}

// =============================================================================
// Block Coding
// =============================================================================

fn scanned_block() -> impl Strategy<Value = Block> {
    (prop::collection::vec(-1023i16..=1023, 64), 0usize..64, 0u32..=10).prop_map(
        |(values, last, magnitude_bits)| {
            let limit = (1i16 << magnitude_bits) - 1;
            let mut block = [0i16; 64];
            block[0] = values[0];
            for i in 1..=last {
                block[i] = values[i].clamp(-limit, limit);
            }
            block
        },
    )
}

proptest! {
    /// Blocks of levels survive entropy coding exactly.
    #[test]
    fn block_coding_roundtrip(blocks in prop::collection::vec(scanned_block(), 1..12)) {
        let mut models = ModelSet::new();
        let mut writer = BitWriter::new();
        let mut encoder = ArithmeticEncoder::new();
        for block in &blocks {
            encode_block(&mut encoder, &mut writer, &mut models, block);
        }
        encoder.flush(&mut writer);

        let mut models = ModelSet::new();
        let mut reader = BitReader::new(writer.data());
        let mut decoder = ArithmeticDecoder::new(&mut reader).unwrap();
        for block in &blocks {
            let mut decoded = [0i16; 64];
            decode_block(&mut decoder, &mut reader, &mut models, &mut decoded).unwrap();
            prop_assert_eq!(&decoded, block);
        }
    }
}

// =============================================================================
// RLE
// =============================================================================

proptest! {
    /// Any row decodes back to itself and never emits the flag byte alone.
    #[test]
    fn rle_row_roundtrip(row in prop::collection::vec(any::<u8>(), 1..1000)) {
        let mut encoded = Vec::new();
        let written = encode_row(&row, &mut encoded);
        prop_assert_eq!(written, encoded.len());

        let mut decoded = vec![0u8; row.len()];
        let consumed = decode_row(&encoded, &mut decoded).unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(decoded, row);
    }

    /// Rows built from long runs round-trip and respect the run limit.
    #[test]
    fn rle_runs_roundtrip(runs in prop::collection::vec((any::<u8>(), 1usize..400), 1..10)) {
        let row: Vec<u8> = runs
            .iter()
            .flat_map(|&(value, len)| std::iter::repeat(value).take(len))
            .collect();
        let mut encoded = Vec::new();
        encode_row(&row, &mut encoded);

        let mut pos = 0;
        while pos < encoded.len() {
            let run = encoded[pos];
            prop_assert!(run != 0 && run != RAW_FLAG);
            pos += if run > RAW_FLAG { 1 + (run - RAW_FLAG) as usize } else { 2 };
        }
        prop_assert_eq!(pos, encoded.len());

        let mut decoded = vec![0u8; row.len()];
        decode_row(&encoded, &mut decoded).unwrap();
        prop_assert_eq!(decoded, row);
    }

    /// Arbitrary input fails cleanly instead of overrunning the row.
    #[test]
    fn rle_decode_arbitrary(data in prop::collection::vec(any::<u8>(), 0..64), width in 1usize..64) {
        let mut row = vec![0u8; width];
        if let Ok(consumed) = decode_row(&data, &mut row) {
            prop_assert!(consumed <= data.len());
        }
    }
}
