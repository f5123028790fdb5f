//! Mel scale and triangular mel filterbank.
//!
//! The filterbank maps FFT bins with `floor((fft_len + 1) * hz / sample_rate)`.
//! The `+ 1` is part of the trained model's input contract: changing it moves
//! filter edges by one bin and yields different features.

use ndarray::Array2;

/// Hz to Mel scale conversion.
///
/// # Example
/// ```
/// use mfx_audio::mel::{hz_to_mel, mel_to_hz};
/// let hz = 1234.5;
/// assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-9);
/// ```
#[inline]
#[must_use]
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Mel to Hz conversion.
#[inline]
#[must_use]
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Build the mel weight matrix, shape `[num_spectrogram_bins, num_mel_bins]`.
///
/// Column `m` is a triangle over FFT bins rising from 0 to 1 and falling back.
/// Zero-width halves are skipped and bins outside the spectrum are ignored,
/// so degenerate parameters produce empty columns rather than errors.
///
/// # Example
/// ```
/// use mfx_audio::mel::build_mel_filterbank;
/// let weights = build_mel_filterbank(40, 513, 16_000, 20.0, 8000.0);
/// assert_eq!(weights.dim(), (513, 40));
/// ```
#[must_use]
pub fn build_mel_filterbank(
    num_mel_bins: usize,
    num_spectrogram_bins: usize,
    sample_rate: u32,
    lower_edge_hz: f64,
    upper_edge_hz: f64,
) -> Array2<f32> {
    let fft_len = num_spectrogram_bins.saturating_sub(1) * 2;
    let mel_low = hz_to_mel(lower_edge_hz);
    let mel_high = hz_to_mel(upper_edge_hz);
    let sample_rate = f64::from(sample_rate);

    // num_mel_bins filters + 2 endpoints, equally spaced in mel
    let bins: Vec<i64> = (0..num_mel_bins + 2)
        .map(|i| {
            let mel = mel_low + (mel_high - mel_low) * (i as f64 / (num_mel_bins + 1) as f64);
            ((fft_len + 1) as f64 * mel_to_hz(mel) / sample_rate).floor() as i64
        })
        .collect();

    let mut weights = Array2::<f32>::zeros((num_spectrogram_bins, num_mel_bins));
    let in_range = |k: i64| usize::try_from(k).ok().filter(|&k| k < num_spectrogram_bins);

    for m in 1..=num_mel_bins {
        let (f0, f1, f2) = (bins[m - 1], bins[m], bins[m + 1]);

        if f1 != f0 {
            for k in f0..f1 {
                if let Some(row) = in_range(k) {
                    weights[[row, m - 1]] = ((k - f0) as f64 / (f1 - f0) as f64) as f32;
                }
            }
        }

        if f2 != f1 {
            for k in f1..f2 {
                if let Some(row) = in_range(k) {
                    let w = (f2 - k) as f64 / (f2 - f1) as f64;
                    weights[[row, m - 1]] = w.max(0.0) as f32;
                }
            }
        }
    }

    log::debug!(
        "Mel filterbank built: {num_spectrogram_bins}x{num_mel_bins}, {lower_edge_hz}-{upper_edge_hz} Hz"
    );
    weights
}
