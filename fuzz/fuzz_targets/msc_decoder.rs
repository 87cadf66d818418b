#![no_main]

//! Fuzz target for the MSC decoder.
//!
//! Feeds arbitrary packets to a decoder in either stream variant. Decoding
//! may fail but must never panic.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msc_codec::MscDecoder;

#[derive(Arbitrary, Debug)]
struct DecoderInput {
    extradata: Vec<u8>,
    width: u8,
    height: u8,
    packets: Vec<Vec<u8>>,
}

fuzz_target!(|input: DecoderInput| {
    let width = (input.width % 80).max(1) as u32;
    let height = (input.height % 80).max(1) as u32;
    let Ok(mut decoder) = MscDecoder::new(&input.extradata, width, height) else {
        return;
    };

    for packet in input.packets.iter().take(8) {
        match decoder.decode(packet) {
            Ok(frame) => {
                assert_eq!((frame.width(), frame.height()), (width, height));
                decoder.recycle(frame);
            }
            Err(_) => {}
        }
    }
});
