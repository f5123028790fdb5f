//! Cuts a sample stream into fixed-length, overlapping clips.

use anyhow::{Result, ensure};
use mfx_core::clip::{CLIP_HOP, CLIP_SAMPLES};

/// One clip cut from a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Offset of the first sample from the start of the stream.
    pub start: usize,
    pub samples: Vec<f32>,
}

impl AsRef<[f32]> for Clip {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

/// Streaming buffer that emits a clip every `hop` samples once `clip_len`
/// samples are available, keeping `clip_len - hop` samples of overlap.
///
/// # Example
/// ```
/// use mfx_audio::accumulator::ClipAccumulator;
/// let mut acc = ClipAccumulator::deployment();
/// assert!(acc.push(&[0.0; 12_000]).is_empty());
/// let clips = acc.push(&[0.0; 12_000]);
/// assert_eq!(clips.len(), 2);
/// assert_eq!(clips[1].start, 8_000);
/// ```
#[derive(Debug)]
pub struct ClipAccumulator {
    clip_len: usize,
    hop: usize,
    buffer: Vec<f32>,
    /// Stream offset of `buffer[0]`.
    offset: usize,
}

impl ClipAccumulator {
    /// # Errors
    /// Returns an error if `clip_len` or `hop` is zero, or `hop > clip_len`.
    pub fn new(clip_len: usize, hop: usize) -> Result<Self> {
        ensure!(clip_len > 0, "clip length must be positive");
        ensure!(hop > 0, "clip hop must be positive");
        ensure!(
            hop <= clip_len,
            "clip hop ({hop}) must not exceed clip length ({clip_len})"
        );
        Ok(Self {
            clip_len,
            hop,
            buffer: Vec::new(),
            offset: 0,
        })
    }

    /// One-second clips every half second.
    #[must_use]
    pub fn deployment() -> Self {
        Self {
            clip_len: CLIP_SAMPLES,
            hop: CLIP_HOP,
            buffer: Vec::with_capacity(CLIP_SAMPLES * 2),
            offset: 0,
        }
    }

    #[must_use]
    pub fn clip_len(&self) -> usize {
        self.clip_len
    }

    #[must_use]
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Samples held but not yet consumed by a hop.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append samples and return every clip that became complete.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Clip> {
        self.buffer.extend_from_slice(samples);

        let mut clips = Vec::new();
        let mut consumed = 0;
        while self.buffer.len() - consumed >= self.clip_len {
            clips.push(Clip {
                start: self.offset + consumed,
                samples: self.buffer[consumed..consumed + self.clip_len].to_vec(),
            });
            consumed += self.hop;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
            self.offset += consumed;
        }
        clips
    }

    /// Remaining samples that never filled a clip.
    #[must_use]
    pub fn into_remainder(self) -> Clip {
        Clip {
            start: self.offset,
            samples: self.buffer,
        }
    }
}
