use std::path::Path;

use anyhow::{Context, Result, ensure};
use mfx_audio::FeatureExtractor;
use mfx_audio::accumulator::{Clip, ClipAccumulator};
use mfx_audio::decode::decode_file;
use mfx_core::SpectralParams;

use crate::cli::Cli;
use crate::report::{ClipFeatures, FeatureReport};

/// Resolve spectral params from an optional TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the params are invalid.
pub fn load_params(path: Option<&Path>) -> Result<SpectralParams> {
    let params = match path {
        Some(path) => SpectralParams::load(path)
            .with_context(|| format!("Config invalide: {}", path.display()))?,
        None => SpectralParams::default(),
    };
    params.validate()?;
    Ok(params)
}

/// Longest accepted clip, one hour.
pub const MAX_CLIP_SECONDS: f64 = 3600.0;

/// Clip length and hop in samples for a duration and overlap fraction.
///
/// # Errors
/// Returns an error on a duration outside (0, [`MAX_CLIP_SECONDS`]], an
/// overlap outside [0, 1), or a geometry that rounds to an empty clip or hop.
///
/// # Example
/// ```
/// use mfx_app::pipeline::clip_geometry;
/// assert_eq!(clip_geometry(16_000, 1.0, 0.5).unwrap(), (16_000, 8_000));
/// ```
pub fn clip_geometry(
    sample_rate: u32,
    clip_seconds: f64,
    overlap: f64,
) -> Result<(usize, usize)> {
    ensure!(
        clip_seconds.is_finite() && clip_seconds > 0.0,
        "clip duration must be positive, got {clip_seconds}"
    );
    ensure!(
        clip_seconds <= MAX_CLIP_SECONDS,
        "clip duration must not exceed {MAX_CLIP_SECONDS}s, got {clip_seconds}"
    );
    ensure!(
        (0.0..1.0).contains(&overlap),
        "overlap must be in [0, 1), got {overlap}"
    );
    let clip_len = (f64::from(sample_rate) * clip_seconds).round() as usize;
    let hop = (clip_len as f64 * (1.0 - overlap)).round() as usize;
    ensure!(
        clip_len > 0 && hop > 0,
        "clip of {clip_seconds}s is empty at {sample_rate} Hz"
    );
    Ok((clip_len, hop.min(clip_len)))
}

/// Cut a whole signal into overlapping clips.
///
/// A signal shorter than one clip becomes a single short clip, so short files
/// still produce a (possibly zero-frame) tensor. Trailing samples after the
/// last full clip are dropped, as in live capture.
///
/// # Errors
/// Returns an error if the geometry is invalid.
pub fn plan_clips(samples: &[f32], clip_len: usize, hop: usize) -> Result<Vec<Clip>> {
    let mut acc = ClipAccumulator::new(clip_len, hop)?;
    let mut clips = acc.push(samples);
    let rest = acc.into_remainder();

    if clips.is_empty() {
        if !rest.samples.is_empty() {
            log::warn!(
                "Input shorter than one clip ({} < {clip_len} samples)",
                rest.samples.len()
            );
            clips.push(rest);
        }
    } else if !rest.samples.is_empty() {
        log::debug!("Dropping {} trailing samples", rest.samples.len());
    }
    Ok(clips)
}

/// Decode the input, cut it into clips and extract every clip's features.
///
/// # Errors
/// Returns an error on invalid params, undecodable input, or a sample-rate
/// mismatch between the file and the params.
pub fn run(cli: &Cli) -> Result<FeatureReport> {
    let params = load_params(cli.config.as_deref())?;
    let extractor = FeatureExtractor::new(params.clone())?;

    let audio = decode_file(&cli.input)?;
    ensure!(
        audio.sample_rate == params.sample_rate,
        "{} is {} Hz but the params expect {} Hz",
        cli.input.display(),
        audio.sample_rate,
        params.sample_rate
    );

    let (clip_len, hop) = clip_geometry(params.sample_rate, cli.clip_seconds, cli.overlap)?;
    let clips = plan_clips(&audio.samples, clip_len, hop)?;
    log::info!(
        "{:.2}s of audio -> {} clips ({clip_len} samples, hop {hop})",
        audio.duration_secs(),
        clips.len()
    );

    let tensors = extractor.extract_batch(&clips);
    let clips = clips
        .iter()
        .zip(&tensors)
        .enumerate()
        .map(|(index, (clip, tensor))| ClipFeatures::new(index, clip.start, tensor))
        .collect();

    Ok(FeatureReport {
        source: cli.input.display().to_string(),
        sample_rate: audio.sample_rate,
        params,
        clips,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_rounds_and_validates() -> Result<()> {
        assert_eq!(clip_geometry(16_000, 1.0, 0.0)?, (16_000, 16_000));
        assert_eq!(clip_geometry(16_000, 0.5, 0.75)?, (8_000, 2_000));
        assert!(clip_geometry(16_000, 0.0, 0.5).is_err());
        assert!(clip_geometry(16_000, 1.0, 1.0).is_err());
        assert!(clip_geometry(16_000, 1.0, -0.1).is_err());
        assert!(clip_geometry(16_000, f64::NAN, 0.5).is_err());
        assert!(clip_geometry(16_000, 1e-6, 0.5).is_err());
        Ok(())
    }

    #[test]
    fn huge_durations_are_rejected() -> Result<()> {
        assert!(clip_geometry(16_000, 1e300, 0.5).is_err());
        assert!(clip_geometry(16_000, 1e9, 0.5).is_err());
        assert!(clip_geometry(u32::MAX, MAX_CLIP_SECONDS + 1.0, 0.0).is_err());

        let (clip_len, hop) = clip_geometry(16_000, MAX_CLIP_SECONDS, 0.5)?;
        assert_eq!((clip_len, hop), (57_600_000, 28_800_000));
        let clips = plan_clips(&[0.1; 1_000], clip_len, hop)?;
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].samples.len(), 1_000);
        Ok(())
    }

    #[test]
    fn short_signal_becomes_one_clip() -> Result<()> {
        let clips = plan_clips(&[0.1; 500], 16_000, 8_000)?;
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].start, 0);
        assert_eq!(clips[0].samples.len(), 500);

        assert!(plan_clips(&[], 16_000, 8_000)?.is_empty());
        Ok(())
    }

    #[test]
    fn long_signal_drops_tail() -> Result<()> {
        let clips = plan_clips(&vec![0.0; 30_000], 16_000, 8_000)?;
        let starts: Vec<usize> = clips.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 8_000]);
        Ok(())
    }

    #[test]
    fn default_params_without_file() -> Result<()> {
        assert_eq!(load_params(None)?, SpectralParams::default());
        Ok(())
    }

    #[test]
    fn missing_config_file_fails() {
        assert!(load_params(Some(Path::new("/nonexistent/params.toml"))).is_err());
    }
}
