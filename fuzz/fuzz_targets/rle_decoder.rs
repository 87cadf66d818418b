#![no_main]

//! Fuzz target for RLE plane decoding.
//!
//! Arbitrary run bytes must either fill the plane or fail with an error,
//! never write outside a row or read past the input.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msc_codec::rle::{decode_plane, encode_plane};
use msc_core::frame::Plane;

#[derive(Arbitrary, Debug)]
struct RleInput {
    width: u8,
    height: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: RleInput| {
    let width = input.width.max(1) as u32;
    let height = (input.height % 64).max(1) as u32;
    let Ok(mut plane) = Plane::new(width, height) else {
        return;
    };

    match decode_plane(&input.data, 0, &mut plane) {
        Ok(consumed) => {
            assert!(consumed <= input.data.len());

            // Whatever decoded must survive a re-encode exactly.
            let mut encoded = Vec::new();
            encode_plane(&plane.view(), &mut encoded);
            let mut again = Plane::new(width, height).unwrap();
            assert_eq!(decode_plane(&encoded, 0, &mut again).ok(), Some(encoded.len()));
            for y in 0..height as usize {
                assert_eq!(plane.row(y), again.row(y));
            }
        }
        Err(_) => {}
    }
});
