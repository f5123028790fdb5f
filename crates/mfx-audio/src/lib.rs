//! MFCC feature extraction for mfx.
//!
//! Waveform → rectangular frames → real FFT magnitude → mel projection →
//! `ln(· + 1e-6)` → orthonormal DCT-II → `[1, T, num_mfcc, 1]`.

pub mod accumulator;
pub mod cache;
pub mod dct;
pub mod decode;
pub mod mel;
pub mod mfcc;
pub mod stft;

pub use cache::{TransformCache, TransformSet};
pub use mfcc::{FeatureExtractor, extract};
