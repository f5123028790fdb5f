//! Fixed clip geometry of the deployed classifier input.

/// Sample rate of every clip fed to the extractor (Hz).
pub const SAMPLE_RATE: u32 = 16_000;

/// Clip duration (seconds).
pub const CLIP_SECONDS: f64 = 1.0;

/// Samples per clip: `SAMPLE_RATE × CLIP_SECONDS`.
pub const CLIP_SAMPLES: usize = 16_000;

/// Hop between consecutive clips of a stream: half a clip (0.5 s overlap).
pub const CLIP_HOP: usize = CLIP_SAMPLES / 2;

/// Number of analysis frames produced for a signal of `len` samples.
///
/// Frames are taken without end padding, so a signal shorter than one frame
/// yields zero frames.
///
/// # Example
/// ```
/// use mfx_core::clip::frame_count;
/// assert_eq!(frame_count(16_000, 640, 320), 49);
/// assert_eq!(frame_count(639, 640, 320), 0);
/// ```
#[must_use]
pub fn frame_count(len: usize, frame_length: usize, frame_step: usize) -> usize {
    if frame_length == 0 || frame_step == 0 || len < frame_length {
        return 0;
    }
    (len - frame_length) / frame_step + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_samples_matches_rate_and_duration() {
        assert_eq!(CLIP_SAMPLES, (f64::from(SAMPLE_RATE) * CLIP_SECONDS) as usize);
    }

    #[test]
    fn frame_count_boundaries() {
        assert_eq!(frame_count(640, 640, 320), 1);
        assert_eq!(frame_count(959, 640, 320), 1);
        assert_eq!(frame_count(960, 640, 320), 2);
        assert_eq!(frame_count(0, 640, 320), 0);
        assert_eq!(frame_count(100, 0, 320), 0);
    }
}
