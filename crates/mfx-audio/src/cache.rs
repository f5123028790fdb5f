//! Process-lifetime cache of the mel filterbank, DCT basis and FFT plan.
//!
//! Readers load an `ArcSwap` snapshot of the map without locking. A miss takes
//! the build mutex, checks the snapshot again, builds, then publishes a new
//! snapshot, so concurrent first calls for one key build exactly once and
//! nobody observes a half-built matrix. Entries are never evicted.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwap;
use mfx_core::{ConfigError, SpectralParams};
use ndarray::Array2;
use realfft::{RealFftPlanner, RealToComplex};

use crate::dct::build_dct_basis;
use crate::mel::build_mel_filterbank;

/// The two immutable matrices of the MFCC projection, plus the forward FFT
/// plan for their `fft_length`.
pub struct TransformSet {
    mel_filterbank: Array2<f32>,
    dct_basis: Array2<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl fmt::Debug for TransformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSet")
            .field("mel_filterbank", &self.mel_filterbank.dim())
            .field("dct_basis", &self.dct_basis.dim())
            .field("fft_length", &self.fft.len())
            .finish()
    }
}

impl PartialEq for TransformSet {
    fn eq(&self, other: &Self) -> bool {
        self.mel_filterbank == other.mel_filterbank
            && self.dct_basis == other.dct_basis
            && self.fft.len() == other.fft.len()
    }
}

impl TransformSet {
    /// Build both matrices and plan the FFT for `params` (assumed validated).
    #[must_use]
    pub fn build(params: &SpectralParams) -> Self {
        Self {
            mel_filterbank: build_mel_filterbank(
                params.num_mel_bins,
                params.num_spectrogram_bins(),
                params.sample_rate,
                params.lower_edge_hz,
                params.upper_edge_hz,
            ),
            dct_basis: build_dct_basis(params.num_mel_bins, params.num_mfcc),
            fft: RealFftPlanner::<f32>::new().plan_fft_forward(params.fft_length),
        }
    }

    /// `[num_spectrogram_bins, num_mel_bins]`.
    #[must_use]
    pub fn mel_filterbank(&self) -> &Array2<f32> {
        &self.mel_filterbank
    }

    /// `[num_mel_bins, num_mfcc]`.
    #[must_use]
    pub fn dct_basis(&self) -> &Array2<f32> {
        &self.dct_basis
    }

    /// Forward real FFT plan, shared by every extractor using this set.
    #[must_use]
    pub fn fft(&self) -> &Arc<dyn RealToComplex<f32>> {
        &self.fft
    }
}

/// Fields the matrices depend on. Framing and window do not enter the key.
/// Edge frequencies are compared bit for bit after folding `-0.0` into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TransformKey {
    sample_rate: u32,
    fft_length: usize,
    num_mel_bins: usize,
    num_mfcc: usize,
    lower_edge_bits: u64,
    upper_edge_bits: u64,
}

impl From<&SpectralParams> for TransformKey {
    fn from(params: &SpectralParams) -> Self {
        Self {
            sample_rate: params.sample_rate,
            fft_length: params.fft_length,
            num_mel_bins: params.num_mel_bins,
            num_mfcc: params.num_mfcc,
            lower_edge_bits: (params.lower_edge_hz + 0.0).to_bits(),
            upper_edge_bits: (params.upper_edge_hz + 0.0).to_bits(),
        }
    }
}

type Entries = HashMap<TransformKey, Arc<TransformSet>>;

/// Lazily built transform matrices, shared by every extractor.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use mfx_audio::TransformCache;
/// use mfx_core::SpectralParams;
///
/// let cache = TransformCache::new();
/// let a = cache.ensure(&SpectralParams::default()).unwrap();
/// let b = cache.ensure(&SpectralParams::default()).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct TransformCache {
    entries: ArcSwap<Entries>,
    build_lock: Mutex<()>,
}

impl TransformCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by [`FeatureExtractor::new`](crate::FeatureExtractor::new).
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<TransformCache> = OnceLock::new();
        GLOBAL.get_or_init(TransformCache::new)
    }

    /// Return the matrices for `params`, building them on first use.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `params` fail validation; nothing is built.
    pub fn ensure(&self, params: &SpectralParams) -> Result<Arc<TransformSet>, ConfigError> {
        params.validate()?;
        let key = TransformKey::from(params);

        if let Some(set) = self.entries.load().get(&key) {
            return Ok(Arc::clone(set));
        }

        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another caller may have built it while we waited.
        if let Some(set) = self.entries.load().get(&key) {
            log::debug!("Transform set for {key:?} built by a concurrent caller");
            return Ok(Arc::clone(set));
        }

        let set = Arc::new(TransformSet::build(params));
        let mut next = Entries::clone(&self.entries.load());
        next.insert(key, Arc::clone(&set));
        self.entries.store(Arc::new(next));

        log::info!(
            "Transform matrices cached: {} mel bins, {} coefficients, fft {}",
            params.num_mel_bins,
            params.num_mfcc,
            params.fft_length
        );
        Ok(set)
    }

    /// Number of distinct transform sets built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use mfx_core::WindowFunction;

    use super::*;

    #[test]
    fn ensure_is_idempotent() -> Result<(), ConfigError> {
        let cache = TransformCache::new();
        assert!(cache.is_empty());

        let params = SpectralParams::default();
        let first = cache.ensure(&params)?;
        let second = cache.ensure(&params.clone())?;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.mel_filterbank().dim(), (513, 40));
        assert_eq!(first.dct_basis().dim(), (40, 13));
        assert_eq!(first.fft().len(), 1024);
        Ok(())
    }

    #[test]
    fn framing_does_not_split_entries() -> Result<(), ConfigError> {
        let cache = TransformCache::new();
        let base = cache.ensure(&SpectralParams::default())?;
        let reframed = cache.ensure(&SpectralParams {
            frame_length: 400,
            frame_step: 160,
            window: WindowFunction::Hann,
            ..SpectralParams::default()
        })?;
        assert!(Arc::ptr_eq(&base, &reframed));
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn signed_zero_edges_share_an_entry() -> Result<(), ConfigError> {
        let cache = TransformCache::new();
        let positive = cache.ensure(&SpectralParams {
            lower_edge_hz: 0.0,
            ..SpectralParams::default()
        })?;
        let negative = cache.ensure(&SpectralParams {
            lower_edge_hz: -0.0,
            ..SpectralParams::default()
        })?;
        assert!(Arc::ptr_eq(&positive, &negative));
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn distinct_params_get_distinct_sets() -> Result<(), ConfigError> {
        let cache = TransformCache::new();
        let a = cache.ensure(&SpectralParams::default())?;
        let b = cache.ensure(&SpectralParams {
            num_mel_bins: 64,
            ..SpectralParams::default()
        })?;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.mel_filterbank().dim(), (513, 64));
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[test]
    fn invalid_params_build_nothing() {
        let cache = TransformCache::new();
        let result = cache.ensure(&SpectralParams {
            upper_edge_hz: 9000.0,
            ..SpectralParams::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidEdges { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let cache = TransformCache::new();
        let params = SpectralParams::default();

        let sets: Vec<Arc<TransformSet>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.ensure(&params)))
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().ok().and_then(Result::ok))
                .collect()
        });

        assert_eq!(sets.len(), 8);
        assert!(sets.iter().all(|s| Arc::ptr_eq(s, &sets[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn separate_caches_agree_in_value() -> Result<(), ConfigError> {
        let params = SpectralParams::default();
        let a = TransformCache::new().ensure(&params)?;
        let b = TransformCache::new().ensure(&params)?;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
        Ok(())
    }
}
