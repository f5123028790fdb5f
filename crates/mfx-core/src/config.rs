use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clip::SAMPLE_RATE;
use crate::error::ConfigError;

/// Analysis window applied to each frame before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// Plain framing, samples are used as-is.
    #[default]
    Rectangular,
    /// Hann window (periodic for even frame lengths, symmetric for odd ones).
    Hann,
}

/// Spectral analysis parameters.
///
/// Defaults are the deployed values: 16 kHz, 40 ms frames every 20 ms,
/// 1024-point FFT, 40 mel bins over 20 Hz – 8 kHz, 13 coefficients.
/// Any value that disagrees with the one used to train the downstream model
/// silently shifts the feature distribution.
///
/// # Example
/// ```
/// use mfx_core::SpectralParams;
/// let params = SpectralParams::default();
/// assert_eq!(params.num_spectrogram_bins(), 513);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralParams {
    pub sample_rate: u32,
    pub frame_length: usize,
    pub frame_step: usize,
    pub fft_length: usize,
    pub num_mel_bins: usize,
    pub num_mfcc: usize,
    pub lower_edge_hz: f64,
    pub upper_edge_hz: f64,
    pub window: WindowFunction,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            frame_length: 640,
            frame_step: 320,
            fft_length: 1024,
            num_mel_bins: 40,
            num_mfcc: 13,
            lower_edge_hz: 20.0,
            upper_edge_hz: f64::from(SAMPLE_RATE) / 2.0,
            window: WindowFunction::Rectangular,
        }
    }
}

impl SpectralParams {
    /// Unique bins of a real FFT of `fft_length` samples.
    #[must_use]
    pub fn num_spectrogram_bins(&self) -> usize {
        self.fft_length / 2 + 1
    }

    /// Nyquist frequency (Hz).
    #[must_use]
    pub fn nyquist_hz(&self) -> f64 {
        f64::from(self.sample_rate) / 2.0
    }

    /// Check every constraint the pipeline relies on.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    ///
    /// # Example
    /// ```
    /// use mfx_core::{ConfigError, SpectralParams};
    /// let params = SpectralParams { fft_length: 512, ..SpectralParams::default() };
    /// assert!(matches!(params.validate(), Err(ConfigError::FftShorterThanFrame { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.frame_length == 0 {
            return Err(ConfigError::ZeroFrameLength);
        }
        if self.frame_step == 0 {
            return Err(ConfigError::ZeroFrameStep);
        }
        if self.fft_length < self.frame_length {
            return Err(ConfigError::FftShorterThanFrame {
                fft_length: self.fft_length,
                frame_length: self.frame_length,
            });
        }
        if self.fft_length % 2 != 0 {
            return Err(ConfigError::OddFftLength(self.fft_length));
        }
        if self.num_mel_bins == 0 {
            return Err(ConfigError::ZeroMelBins);
        }
        if self.num_mfcc == 0 {
            return Err(ConfigError::ZeroMfcc);
        }
        if self.num_mfcc > self.num_mel_bins {
            return Err(ConfigError::TooManyCoefficients {
                num_mfcc: self.num_mfcc,
                num_mel_bins: self.num_mel_bins,
            });
        }

        let nyquist = self.nyquist_hz();
        let (lower, upper) = (self.lower_edge_hz, self.upper_edge_hz);
        // NaN fails every comparison, so it lands here too.
        let edges_ok = lower.is_finite()
            && upper.is_finite()
            && lower >= 0.0
            && lower < upper
            && upper <= nyquist;
        if !edges_ok {
            return Err(ConfigError::InvalidEdges {
                lower,
                upper,
                nyquist,
            });
        }
        Ok(())
    }

    /// Parse and validate params from TOML. Missing keys take their default.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML, or a validation error.
    ///
    /// # Example
    /// ```
    /// use mfx_core::SpectralParams;
    /// let params = SpectralParams::from_toml_str("num_mfcc = 20").unwrap();
    /// assert_eq!(params.num_mfcc, 20);
    /// assert_eq!(params.num_mel_bins, 40);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate params from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`SpectralParams::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_toml_str(&text)?;
        log::info!("Spectral params loaded from {}", path.display());
        Ok(params)
    }

    /// Render the params as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SpectralParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.num_spectrogram_bins(), 513);
        assert!((params.upper_edge_hz - 8000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_fft_shorter_than_frame() {
        let params = SpectralParams {
            fft_length: 320,
            ..SpectralParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::FftShorterThanFrame {
                fft_length: 320,
                frame_length: 640
            })
        ));
    }

    #[test]
    fn rejects_bad_edges() {
        let above_nyquist = SpectralParams {
            upper_edge_hz: 8000.5,
            ..SpectralParams::default()
        };
        assert!(matches!(
            above_nyquist.validate(),
            Err(ConfigError::InvalidEdges { .. })
        ));

        let inverted = SpectralParams {
            lower_edge_hz: 4000.0,
            upper_edge_hz: 300.0,
            ..SpectralParams::default()
        };
        assert!(inverted.validate().is_err());

        let negative = SpectralParams {
            lower_edge_hz: -1.0,
            ..SpectralParams::default()
        };
        assert!(negative.validate().is_err());

        let nan = SpectralParams {
            lower_edge_hz: f64::NAN,
            ..SpectralParams::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn rejects_zero_counts() {
        let cases = [
            SpectralParams {
                sample_rate: 0,
                ..SpectralParams::default()
            },
            SpectralParams {
                frame_step: 0,
                ..SpectralParams::default()
            },
            SpectralParams {
                num_mel_bins: 0,
                ..SpectralParams::default()
            },
            SpectralParams {
                num_mfcc: 0,
                ..SpectralParams::default()
            },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "accepted {params:?}");
        }
    }

    #[test]
    fn rejects_odd_fft_and_excess_coefficients() {
        let odd = SpectralParams {
            fft_length: 1025,
            ..SpectralParams::default()
        };
        assert!(matches!(odd.validate(), Err(ConfigError::OddFftLength(1025))));

        let excess = SpectralParams {
            num_mfcc: 41,
            ..SpectralParams::default()
        };
        assert!(matches!(
            excess.validate(),
            Err(ConfigError::TooManyCoefficients { .. })
        ));
    }

    #[test]
    fn toml_partial_and_window() -> Result<(), ConfigError> {
        let params = SpectralParams::from_toml_str(
            "frame_length = 400\nframe_step = 160\nfft_length = 512\nwindow = \"hann\"\n",
        )?;
        assert_eq!(params.frame_length, 400);
        assert_eq!(params.frame_step, 160);
        assert_eq!(params.fft_length, 512);
        assert_eq!(params.window, WindowFunction::Hann);
        assert_eq!(params.num_mfcc, 13);
        Ok(())
    }

    #[test]
    fn toml_invalid_values_are_rejected() {
        assert!(matches!(
            SpectralParams::from_toml_str("fft_length = 256"),
            Err(ConfigError::FftShorterThanFrame { .. })
        ));
        assert!(matches!(
            SpectralParams::from_toml_str("window = \"blackman\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file_and_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let original = SpectralParams {
            num_mel_bins: 64,
            num_mfcc: 20,
            ..SpectralParams::default()
        };
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(original.to_toml_string()?.as_bytes())?;

        let loaded = SpectralParams::load(file.path())?;
        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SpectralParams::load(Path::new("/nonexistent/mfx/params.toml"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
