use std::path::PathBuf;

/// Rejected spectral configuration.
///
/// Raised when [`SpectralParams`](crate::SpectralParams) are validated, loaded
/// from disk, or handed to the transform cache. Extraction itself never fails
/// once parameters have passed validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sample_rate must be positive")]
    ZeroSampleRate,

    #[error("frame_length must be positive")]
    ZeroFrameLength,

    #[error("frame_step must be positive")]
    ZeroFrameStep,

    #[error("fft_length ({fft_length}) must be >= frame_length ({frame_length})")]
    FftShorterThanFrame {
        fft_length: usize,
        frame_length: usize,
    },

    #[error("fft_length ({0}) must be even")]
    OddFftLength(usize),

    #[error("num_mel_bins must be positive")]
    ZeroMelBins,

    #[error("num_mfcc must be positive")]
    ZeroMfcc,

    #[error("num_mfcc ({num_mfcc}) must not exceed num_mel_bins ({num_mel_bins})")]
    TooManyCoefficients { num_mfcc: usize, num_mel_bins: usize },

    #[error(
        "edge frequencies must satisfy 0 <= lower ({lower}) < upper ({upper}) <= nyquist ({nyquist})"
    )]
    InvalidEdges { lower: f64, upper: f64, nyquist: f64 },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid spectral config: {0}")]
    Parse(#[from] toml::de::Error),
}
