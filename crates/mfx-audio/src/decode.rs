//! Audio file decoding to mono f32 via symphonia.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded mono signal.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Average interleaved frames down to one channel.
///
/// # Example
/// ```
/// use mfx_audio::decode::downmix_to_mono;
/// assert_eq!(downmix_to_mono(&[1.0, 0.0, 0.5, 0.5], 2), vec![0.5, 0.5]);
/// ```
#[must_use]
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Decode the first audio track of `path` to mono f32.
///
/// # Errors
/// Returns an error if the file cannot be opened, has no decodable track, or
/// fails with an unrecoverable decode error.
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("Unsupported audio format: {}", path.display()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .with_context(|| format!("No audio track in {}", path.display()))?;
    let track_id = track.id;
    let Some(sample_rate) = track.codec_params.sample_rate else {
        bail!("Unknown sample rate in {}", path.display());
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("No decoder for {}", path.display()))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping corrupt packet: {msg}");
                continue;
            }
            Err(e) => return Err(e).context("Decode failed"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let needed = decoded.capacity() * channels;
        if sample_buf.as_ref().is_none_or(|b| b.capacity() < needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix_to_mono(buf.samples(), channels));
    }

    log::info!(
        "Decoded {}: {} samples @ {sample_rate} Hz",
        path.display(),
        samples.len()
    );
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let stereo = [1.0, -1.0, 0.25, 0.75, 0.5, 0.5];
        assert_eq!(downmix_to_mono(&stereo, 2), vec![0.0, 0.5, 0.5]);
        assert_eq!(downmix_to_mono(&stereo, 1), stereo.to_vec());
    }

    #[test]
    fn downmix_drops_incomplete_frame() {
        assert_eq!(downmix_to_mono(&[0.3, 0.3, 0.3, 0.9], 3), vec![0.3]);
    }

    #[test]
    fn duration_from_rate() {
        let audio = DecodedAudio {
            samples: vec![0.0; 24_000],
            sample_rate: 16_000,
        };
        assert!((audio.duration_secs() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_file(Path::new("/nonexistent/clip.wav")).is_err());
    }
}
