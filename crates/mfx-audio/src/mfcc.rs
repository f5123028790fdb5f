//! Mel-Frequency Cepstral Coefficients (MFCC) extraction.
//!
//! Magnitude (not power) spectrogram, mel projection, `ln(mel + 1e-6)`,
//! orthonormal DCT-II. Every step matches the reference pipeline the
//! classifier was trained on; see [`FeatureExtractor::extract`].

use std::sync::Arc;

use mfx_core::{ConfigError, FeatureTensor, SpectralParams};
use rayon::prelude::*;

use crate::cache::{TransformCache, TransformSet};
use crate::stft::Stft;

/// Additive floor before the logarithm.
pub const LOG_FLOOR: f32 = 1e-6;

/// Waveform → MFCC tensor for one fixed parameter set.
///
/// Cheap to share: `extract` takes `&self` and allocates its own scratch, so
/// one extractor can serve any number of threads.
///
/// # Example
/// ```
/// use mfx_audio::FeatureExtractor;
/// use mfx_core::SpectralParams;
/// let extractor = FeatureExtractor::new(SpectralParams::default()).unwrap();
/// let features = extractor.extract(&[0.0; 16_000]);
/// assert_eq!(features.shape(), [1, 49, 13, 1]);
/// ```
#[derive(Debug)]
pub struct FeatureExtractor {
    params: SpectralParams,
    transforms: Arc<TransformSet>,
    stft: Stft,
}

impl FeatureExtractor {
    /// Create an extractor backed by the process-wide [`TransformCache`].
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `params` are invalid.
    pub fn new(params: SpectralParams) -> Result<Self, ConfigError> {
        Self::with_cache(params, TransformCache::global())
    }

    /// Create an extractor whose matrices come from `cache`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `params` are invalid.
    pub fn with_cache(
        params: SpectralParams,
        cache: &TransformCache,
    ) -> Result<Self, ConfigError> {
        let transforms = cache.ensure(&params)?;
        let stft = Stft::with_plan(
            params.frame_length,
            params.frame_step,
            Arc::clone(transforms.fft()),
            params.window,
        )?;
        Ok(Self {
            params,
            transforms,
            stft,
        })
    }

    #[must_use]
    pub fn params(&self) -> &SpectralParams {
        &self.params
    }

    #[must_use]
    pub fn transforms(&self) -> &Arc<TransformSet> {
        &self.transforms
    }

    /// Compute the `[1, T, num_mfcc, 1]` feature tensor of `clip`.
    ///
    /// `T = (len - frame_length) / frame_step + 1`, or 0 when the clip is
    /// shorter than one frame (an empty but well-shaped tensor).
    #[must_use]
    pub fn extract(&self, clip: &[f32]) -> FeatureTensor {
        // [T, bins]
        let spectrogram = self.stft.magnitudes(clip);
        // [T, mel]
        let mel = spectrogram.dot(self.transforms.mel_filterbank());
        let log_mel = mel.mapv_into(|v| (v + LOG_FLOOR).ln());
        // [T, mfcc]
        let mfcc = log_mel.dot(self.transforms.dct_basis());

        log::trace!("Extracted {} frames from {} samples", mfcc.nrows(), clip.len());
        FeatureTensor::from_frames(mfcc)
    }

    /// Extract many clips in parallel. Output order follows input order.
    #[must_use]
    pub fn extract_batch<C>(&self, clips: &[C]) -> Vec<FeatureTensor>
    where
        C: AsRef<[f32]> + Sync,
    {
        clips
            .par_iter()
            .map(|clip| self.extract(clip.as_ref()))
            .collect()
    }
}

/// One-shot extraction with the process-wide cache.
///
/// Matrices and the FFT plan come from the cache, but each call still
/// validates `params` and rebuilds the framing (and Hann window, if any).
/// Callers extracting many clips should hold a [`FeatureExtractor`].
///
/// # Errors
/// Returns a [`ConfigError`] if `params` are invalid.
///
/// # Example
/// ```
/// use mfx_core::SpectralParams;
/// let features = mfx_audio::extract(&[0.0; 600], &SpectralParams::default()).unwrap();
/// assert_eq!(features.shape(), [1, 0, 13, 1]);
/// ```
pub fn extract(clip: &[f32], params: &SpectralParams) -> Result<FeatureTensor, ConfigError> {
    let extractor = FeatureExtractor::new(params.clone())?;
    Ok(extractor.extract(clip))
}
