//! Peak Signal-to-Noise Ratio (PSNR) between two frames.
//!
//! Used to bound the loss of the transform path. Typical PSNR values:
//! - Excellent: > 40 dB
//! - Good: 30-40 dB
//! - Acceptable: 20-30 dB

use crate::error::{CodecError, Result};
use crate::frame::{Frame, NUM_PLANES};

/// Peak value of an 8-bit sample.
const MAX_VALUE: f64 = 255.0;

/// PSNR result.
#[derive(Debug, Clone, Copy)]
pub struct PsnrResult {
    /// Overall PSNR over every sample of every plane (dB).
    pub psnr: f64,
    /// MSE over every sample of every plane.
    pub mse: f64,
    /// Per-plane PSNR values [Y, U, V] (dB).
    pub per_plane: [f64; NUM_PLANES],
}

fn to_db(mse: f64) -> f64 {
    if mse > 0.0 {
        10.0 * (MAX_VALUE * MAX_VALUE / mse).log10()
    } else {
        f64::INFINITY
    }
}

/// Calculate PSNR between a reference and a distorted frame.
pub fn calculate(reference: &Frame, distorted: &Frame) -> Result<PsnrResult> {
    if reference.width() != distorted.width() || reference.height() != distorted.height() {
        return Err(CodecError::DimensionMismatch {
            width: distorted.width(),
            height: distorted.height(),
            expected_width: reference.width(),
            expected_height: reference.height(),
        }
        .into());
    }

    let mut per_plane = [0.0f64; NUM_PLANES];
    let mut total_error = 0.0f64;
    let mut total_samples = 0usize;

    for (index, plane_psnr) in per_plane.iter_mut().enumerate() {
        let a = reference.plane(index);
        let b = distorted.plane(index);
        let samples = a.width() as usize * a.height() as usize;

        let error: f64 = (0..a.height() as usize)
            .flat_map(move |y| a.row(y).iter().zip(b.row(y)))
            .map(|(&p, &q)| {
                let diff = p as f64 - q as f64;
                diff * diff
            })
            .sum();

        *plane_psnr = to_db(error / samples as f64);
        total_error += error;
        total_samples += samples;
    }

    let mse = total_error / total_samples as f64;
    Ok(PsnrResult {
        psnr: to_db(mse),
        mse,
        per_plane,
    })
}

/// Convenience function for the overall PSNR.
pub fn psnr(reference: &Frame, distorted: &Frame) -> Result<f64> {
    Ok(calculate(reference, distorted)?.psnr)
}
