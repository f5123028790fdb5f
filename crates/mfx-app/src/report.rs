use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mfx_core::{FeatureTensor, SpectralParams};
use serde::Serialize;

/// Features of every clip of one input file.
#[derive(Debug, Serialize)]
pub struct FeatureReport {
    pub source: String,
    pub sample_rate: u32,
    pub params: SpectralParams,
    pub clips: Vec<ClipFeatures>,
}

/// One clip's tensor, flattened row-major.
#[derive(Debug, Serialize)]
pub struct ClipFeatures {
    pub index: usize,
    pub start_sample: usize,
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl ClipFeatures {
    #[must_use]
    pub fn new(index: usize, start_sample: usize, tensor: &FeatureTensor) -> Self {
        Self {
            index,
            start_sample,
            shape: tensor.shape(),
            data: tensor.to_vec(),
        }
    }
}

/// Serialize `report` as JSON to `output`, or stdout when `None`.
///
/// # Errors
/// Returns an error if the file cannot be created or writing fails.
pub fn write_report(report: &FeatureReport, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Impossible de créer {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, report)?;
            writer.flush()?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer(&mut writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
