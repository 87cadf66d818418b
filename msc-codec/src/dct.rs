//! 8x8 orthonormal DCT in fixed point.
//!
//! Both directions are separable matrix products against an integer basis
//! scaled by 2^15, accumulated in `i64` and rounded half up once at the end.
//! The DC basis row is flat, so a constant block transforms to a lone DC
//! coefficient of eight times its value.

use crate::tables::{BLOCK_COEFFS, BLOCK_SIZE, DCT_COS};

/// Fractional bits of the 2-D transform (two basis factors of 2^15).
const SHIFT: u32 = 30;
const ROUND: i64 = 1 << (SHIFT - 1);

/// `c(u) / 2 * cos((2x + 1) * u * pi / 16)` scaled by 2^15.
const fn basis_value(u: usize, x: usize) -> i32 {
    if u == 0 {
        // 1 / (2 * sqrt(2)) * 2^15 == cos(pi/4) * 2^14
        return DCT_COS[4];
    }
    let mut k = ((2 * x + 1) * u) % 32;
    if k > 16 {
        k = 32 - k;
    }
    if k < 8 {
        DCT_COS[k]
    } else if k == 8 {
        0
    } else {
        -DCT_COS[16 - k]
    }
}

const fn build_basis() -> [[i32; BLOCK_SIZE]; BLOCK_SIZE] {
    let mut basis = [[0i32; BLOCK_SIZE]; BLOCK_SIZE];
    let mut u = 0;
    while u < BLOCK_SIZE {
        let mut x = 0;
        while x < BLOCK_SIZE {
            basis[u][x] = basis_value(u, x);
            x += 1;
        }
        u += 1;
    }
    basis
}

/// DCT basis, `BASIS[frequency][sample]`.
static BASIS: [[i32; BLOCK_SIZE]; BLOCK_SIZE] = build_basis();

/// Forward 2-D DCT of a raster-order block.
pub fn forward_dct_2d(input: &[i16; BLOCK_COEFFS], output: &mut [i32; BLOCK_COEFFS]) {
    let mut temp = [0i64; BLOCK_COEFFS];

    // Rows
    for y in 0..BLOCK_SIZE {
        let row = &input[y * BLOCK_SIZE..(y + 1) * BLOCK_SIZE];
        for (u, basis) in BASIS.iter().enumerate() {
            temp[y * BLOCK_SIZE + u] = row
                .iter()
                .zip(basis)
                .map(|(&s, &b)| s as i64 * b as i64)
                .sum();
        }
    }

    // Columns
    for u in 0..BLOCK_SIZE {
        for (v, basis) in BASIS.iter().enumerate() {
            let sum: i64 = (0..BLOCK_SIZE)
                .map(|y| temp[y * BLOCK_SIZE + u] * basis[y] as i64)
                .sum();
            output[v * BLOCK_SIZE + u] = ((sum + ROUND) >> SHIFT) as i32;
        }
    }
}

/// Inverse 2-D DCT back to raster-order samples.
///
/// Results saturate at the `i16` range; callers clamp to pixels anyway.
pub fn inverse_dct_2d(input: &[i32; BLOCK_COEFFS], output: &mut [i16; BLOCK_COEFFS]) {
    let mut temp = [0i64; BLOCK_COEFFS];

    // Rows: frequency u to sample x
    for v in 0..BLOCK_SIZE {
        let row = &input[v * BLOCK_SIZE..(v + 1) * BLOCK_SIZE];
        for x in 0..BLOCK_SIZE {
            temp[v * BLOCK_SIZE + x] = row
                .iter()
                .zip(BASIS.iter())
                .map(|(&c, basis)| c as i64 * basis[x] as i64)
                .sum();
        }
    }

    // Columns: frequency v to sample y
    for x in 0..BLOCK_SIZE {
        for y in 0..BLOCK_SIZE {
            let sum: i64 = BASIS
                .iter()
                .enumerate()
                .map(|(v, basis)| temp[v * BLOCK_SIZE + x] * basis[y] as i64)
                .sum();
            let value = (sum + ROUND) >> SHIFT;
            output[y * BLOCK_SIZE + x] = value.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
        }
    }
}
