//! Constant tables for the MSC transform path.

/// Zigzag scan order (scan index to raster position)
pub const ZIGZAG_SCAN: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Inverse zigzag scan (raster position to scan index)
pub const ZIGZAG_INVERSE: [usize; 64] = [
    0, 1, 5, 6, 14, 15, 27, 28, 2, 4, 7, 13, 16, 26, 29, 42, 3, 8, 12, 17, 25, 30, 41, 43, 9, 11,
    18, 24, 31, 40, 44, 53, 10, 19, 23, 32, 39, 45, 52, 54, 20, 22, 33, 38, 46, 51, 55, 60, 21, 34,
    37, 47, 50, 56, 59, 61, 35, 36, 48, 49, 57, 58, 62, 63,
];

/// JPEG luminance weights (quality 50), raster order.
///
/// Scaled by the quantizer scale to build the intra matrix.
pub const JPEG_LUMA: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// DCT cosine coefficients scaled by 2^14
pub const DCT_COS: [i32; 8] = [
    16384, // cos(0 * pi/16) * 2^14
    16069, // cos(1 * pi/16) * 2^14
    15137, // cos(2 * pi/16) * 2^14
    13623, // cos(3 * pi/16) * 2^14
    11585, // cos(4 * pi/16) * 2^14
    9102,  // cos(5 * pi/16) * 2^14
    6270,  // cos(6 * pi/16) * 2^14
    3196,  // cos(7 * pi/16) * 2^14
];

/// Macroblock size in luma pixels
pub const MB_SIZE: usize = 16;

/// DCT block size
pub const BLOCK_SIZE: usize = 8;

/// Number of coefficients in a block
pub const BLOCK_COEFFS: usize = 64;

/// Blocks per macroblock: four luma, one U, one V.
pub const BLOCKS_PER_MB: usize = 6;

/// Largest quantized coefficient magnitude the entropy stage can carry.
pub const MAX_COEFFICIENT: i16 = 1023;

/// Apply zigzag scan to a block
pub fn zigzag_block(block: &[i16; 64]) -> [i16; 64] {
    let mut output = [0i16; 64];
    for (i, &idx) in ZIGZAG_SCAN.iter().enumerate() {
        output[i] = block[idx];
    }
    output
}

/// Apply inverse zigzag scan to a block
pub fn inverse_zigzag_block(zigzag: &[i16; 64]) -> [i16; 64] {
    let mut output = [0i16; 64];
    for (pos, &idx) in ZIGZAG_INVERSE.iter().enumerate() {
        output[pos] = zigzag[idx];
    }
    output
}
