//! Scalar quantization with reciprocal multiplication.
//!
//! Matrices are kept in raster order with a scale of 16 meaning a step of
//! one. Quantization multiplies by a 2^20 reciprocal and shifts, so no
//! division happens per coefficient. The DC coefficient always uses a fixed
//! step of 8 regardless of the matrix.

use crate::tables::{BLOCK_COEFFS, JPEG_LUMA, MAX_COEFFICIENT};

/// Smallest matrix entry, a quantizer step of one.
pub const MIN_MATRIX_VALUE: u32 = 16;

/// Flat weight of the inter matrix before scaling.
const INTER_WEIGHT: u32 = 16;

/// Reciprocal of the fixed DC step of 8, in 2^16 units.
const DC_RECIPROCAL: i64 = (1 << 16) / 8;

/// DC dequantization factor.
const DC_SCALE: i32 = 8;

/// Quantizer scale limits.
pub const MIN_QSCALE: u8 = 1;
/// Quantizer scale limits.
pub const MAX_QSCALE: u8 = 31;

/// Quantization matrices and their reciprocals for one quantizer scale.
#[derive(Debug, Clone)]
pub struct QuantMatrices {
    intra: [u16; BLOCK_COEFFS],
    inter: [u16; BLOCK_COEFFS],
    intra_reciprocal: [i64; BLOCK_COEFFS],
    inter_reciprocal: [i64; BLOCK_COEFFS],
}

fn reciprocal(matrix: u16) -> i64 {
    let m = matrix as i64;
    ((1 << 20) + m / 2) / m
}

impl QuantMatrices {
    /// Build the matrices for `qscale` (expected in `1..=31`).
    pub fn new(qscale: u8) -> Self {
        debug_assert!((MIN_QSCALE..=MAX_QSCALE).contains(&qscale));
        let q = qscale as u32;

        let mut intra = [0u16; BLOCK_COEFFS];
        for (m, &w) in intra.iter_mut().zip(JPEG_LUMA.iter()) {
            *m = (w as u32 * q / 4).max(MIN_MATRIX_VALUE) as u16;
        }
        let inter = [(INTER_WEIGHT * q / 8).max(MIN_MATRIX_VALUE) as u16; BLOCK_COEFFS];

        Self {
            intra_reciprocal: intra.map(reciprocal),
            inter_reciprocal: inter.map(reciprocal),
            intra,
            inter,
        }
    }

    /// Matrix for intra (`true`) or difference (`false`) blocks.
    pub fn matrix(&self, intra: bool) -> &[u16; BLOCK_COEFFS] {
        if intra {
            &self.intra
        } else {
            &self.inter
        }
    }

    /// Quantize raster-order DCT coefficients.
    ///
    /// Levels outside `±MAX_COEFFICIENT` are clipped. Returns the
    /// pre-clip level of largest magnitude when anything was clipped.
    pub fn quantize(
        &self,
        coeffs: &[i32; BLOCK_COEFFS],
        intra: bool,
        levels: &mut [i16; BLOCK_COEFFS],
    ) -> Option<i64> {
        let reciprocals = if intra {
            &self.intra_reciprocal
        } else {
            &self.inter_reciprocal
        };
        let limit = MAX_COEFFICIENT as i64;
        let mut clipped: Option<i64> = None;

        for (i, (level, &coef)) in levels.iter_mut().zip(coeffs.iter()).enumerate() {
            let q = if i == 0 { DC_RECIPROCAL } else { reciprocals[i] };
            let value = (coef as i64 * q + (1 << 15)) >> 16;
            if value.abs() > limit && clipped.map_or(true, |c| value.abs() > c.abs()) {
                clipped = Some(value);
            }
            *level = value.clamp(-limit, limit) as i16;
        }
        clipped
    }

    /// Scale raster-order levels back to DCT coefficients.
    pub fn dequantize(
        &self,
        levels: &[i16; BLOCK_COEFFS],
        intra: bool,
        coeffs: &mut [i32; BLOCK_COEFFS],
    ) {
        let matrix = self.matrix(intra);
        coeffs[0] = levels[0] as i32 * DC_SCALE;
        for i in 1..BLOCK_COEFFS {
            coeffs[i] = (levels[i] as i32 * matrix[i] as i32) >> 4;
        }
    }
}
