//! Orthonormal DCT-II basis.

use std::f64::consts::PI;

use ndarray::Array2;

/// Build the DCT-II basis, shape `[num_mel_bins, num_mfcc]`.
///
/// `basis[[n, k]] = scale(k) * cos(π / N * (n + 0.5) * k)` with
/// `scale(0) = 1/√N` and `scale(k) = √(2/N)` otherwise, so columns are
/// orthonormal for `num_mfcc <= num_mel_bins`.
///
/// # Example
/// ```
/// use mfx_audio::dct::build_dct_basis;
/// let basis = build_dct_basis(40, 13);
/// assert_eq!(basis.dim(), (40, 13));
/// ```
#[must_use]
pub fn build_dct_basis(num_mel_bins: usize, num_mfcc: usize) -> Array2<f32> {
    let n_bins = num_mel_bins as f64;
    let scale0 = 1.0 / n_bins.sqrt();
    let scale = (2.0 / n_bins).sqrt();

    let basis = Array2::from_shape_fn((num_mel_bins, num_mfcc), |(n, k)| {
        let cos = (PI / n_bins * (n as f64 + 0.5) * k as f64).cos();
        let s = if k == 0 { scale0 } else { scale };
        (s * cos) as f32
    });

    log::debug!("DCT-II basis built: {num_mel_bins}x{num_mfcc}");
    basis
}
