//! mfx application layer: CLI, file pipeline, JSON report.

pub mod cli;
pub mod pipeline;
pub mod report;
