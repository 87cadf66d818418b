#![no_main]

//! Fuzz target for BitReader and BitWriter.
//!
//! Drives the reader with arbitrary operation sequences and checks that
//! bits written by the writer read back unchanged.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msc_core::bitstream::{BitReader, BitWriter};

#[derive(Arbitrary, Debug)]
struct BitstreamInput {
    data: Vec<u8>,
    operations: Vec<BitOperation>,
    writes: Vec<(u32, u8)>,
}

#[derive(Arbitrary, Debug, Clone)]
enum BitOperation {
    ReadBit,
    /// Read n bits (1-32)
    ReadBits(u8),
    ReadU8,
    Skip(u8),
    PeekBits(u8),
    AlignToByte,
}

fuzz_target!(|input: BitstreamInput| {
    if input.operations.len() > 10000 || input.writes.len() > 10000 {
        return;
    }

    let mut reader = BitReader::new(&input.data);
    for op in input.operations.iter().take(1000) {
        let before = reader.position();
        match op {
            BitOperation::ReadBit => {
                let _ = reader.read_bit();
            }
            BitOperation::ReadBits(n) => {
                let _ = reader.read_bits((*n % 32).max(1));
            }
            BitOperation::ReadU8 => {
                let _ = reader.read_u8();
            }
            BitOperation::Skip(n) => {
                let _ = reader.skip(*n as usize);
            }
            BitOperation::PeekBits(n) => {
                let _ = reader.peek_bits((*n % 32).max(1));
                assert_eq!(reader.position(), before);
            }
            BitOperation::AlignToByte => reader.align_to_byte(),
        }
        assert!(reader.position() <= reader.total_bits());
    }

    // Roundtrip
    let mut writer = BitWriter::new();
    let writes: Vec<(u32, u8)> = input
        .writes
        .iter()
        .take(1000)
        .map(|&(value, n)| {
            let n = (n % 32).max(1);
            (value & ((1u32 << n) - 1), n)
        })
        .collect();
    for &(value, n) in &writes {
        writer.write_bits(value, n);
    }
    writer.flush();

    let mut reader = BitReader::new(writer.data());
    for &(value, n) in &writes {
        assert_eq!(reader.read_bits(n).ok(), Some(value));
    }
});
