//! Short-time Fourier magnitude spectrogram.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use mfx_core::{ConfigError, WindowFunction};
use mfx_core::clip::frame_count;
use ndarray::Array2;
use realfft::{RealFftPlanner, RealToComplex};

/// Hann coefficients as defined by TensorFlow's `hann_window`:
/// periodic for even lengths, symmetric for odd ones.
///
/// # Example
/// ```
/// use mfx_audio::stft::hann_window;
/// let w = hann_window(4);
/// assert_eq!(w, vec![0.0, 0.5, 1.0, 0.5]);
/// ```
#[must_use]
pub fn hann_window(len: usize) -> Vec<f32> {
    let even = usize::from(len % 2 == 0);
    let denom = (len + even).saturating_sub(1).max(1) as f64;
    (0..len)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos()) as f32)
        .collect()
}

/// Framing + real FFT plan for one `(frame_length, frame_step, fft_length)`.
///
/// Stateless between calls: scratch buffers are allocated per
/// [`Stft::magnitudes`] call, so one plan is shared across threads.
pub struct Stft {
    frame_length: usize,
    frame_step: usize,
    fft_length: usize,
    /// `None` for rectangular framing: samples are copied untouched.
    window: Option<Vec<f32>>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl fmt::Debug for Stft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stft")
            .field("frame_length", &self.frame_length)
            .field("frame_step", &self.frame_step)
            .field("fft_length", &self.fft_length)
            .field("windowed", &self.window.is_some())
            .finish_non_exhaustive()
    }
}

impl Stft {
    /// Plan an STFT with its own FFT.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `frame_length` or `frame_step` is zero, or
    /// `fft_length < frame_length`.
    ///
    /// # Example
    /// ```
    /// use mfx_audio::stft::Stft;
    /// use mfx_core::WindowFunction;
    /// assert!(Stft::new(640, 320, 512, WindowFunction::Rectangular).is_err());
    /// ```
    pub fn new(
        frame_length: usize,
        frame_step: usize,
        fft_length: usize,
        window: WindowFunction,
    ) -> Result<Self, ConfigError> {
        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(fft_length);
        Self::with_plan(frame_length, frame_step, fft, window)
    }

    /// Same as [`Stft::new`] over an existing forward plan; the FFT length is
    /// the plan's length.
    pub(crate) fn with_plan(
        frame_length: usize,
        frame_step: usize,
        fft: Arc<dyn RealToComplex<f32>>,
        window: WindowFunction,
    ) -> Result<Self, ConfigError> {
        let fft_length = fft.len();
        if frame_length == 0 {
            return Err(ConfigError::ZeroFrameLength);
        }
        if frame_step == 0 {
            return Err(ConfigError::ZeroFrameStep);
        }
        if fft_length < frame_length {
            return Err(ConfigError::FftShorterThanFrame {
                fft_length,
                frame_length,
            });
        }

        let window = match window {
            WindowFunction::Rectangular => None,
            WindowFunction::Hann => Some(hann_window(frame_length)),
        };
        Ok(Self {
            frame_length,
            frame_step,
            fft_length,
            window,
            fft,
        })
    }

    /// Unique bins per frame: `fft_length / 2 + 1`.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.fft_length / 2 + 1
    }

    #[must_use]
    pub fn num_frames(&self, signal_len: usize) -> usize {
        frame_count(signal_len, self.frame_length, self.frame_step)
    }

    /// Magnitude spectrogram `|X|`, shape `[T, fft_length / 2 + 1]`.
    ///
    /// Frames start every `frame_step` samples, are zero-padded to
    /// `fft_length`, and the tail shorter than a frame is dropped.
    #[must_use]
    pub fn magnitudes(&self, signal: &[f32]) -> Array2<f32> {
        let frames = self.num_frames(signal.len());
        let mut out = Array2::<f32>::zeros((frames, self.num_bins()));
        if frames == 0 {
            return out;
        }

        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut scratch = self.fft.make_scratch_vec();

        for (t, mut row) in out.rows_mut().into_iter().enumerate() {
            let start = t * self.frame_step;
            let frame = &signal[start..start + self.frame_length];

            // realfft uses the input as scratch: refill padding every frame
            input.fill(0.0);
            match &self.window {
                None => input[..self.frame_length].copy_from_slice(frame),
                Some(window) => {
                    for ((dst, &x), &w) in input.iter_mut().zip(frame).zip(window) {
                        *dst = x * w;
                    }
                }
            }

            if let Err(err) = self
                .fft
                .process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            {
                log::error!("rfft failed on frame {t}: {err}");
                continue;
            }

            for (dst, c) in row.iter_mut().zip(&spectrum) {
                *dst = (c.re * c.re + c.im * c.im).sqrt();
            }
        }

        out
    }
}
