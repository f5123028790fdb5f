//! Shared types for mfx: clip constants, spectral configuration, feature tensors.

pub mod clip;
pub mod config;
pub mod error;
pub mod tensor;

pub use config::{SpectralParams, WindowFunction};
pub use error::ConfigError;
pub use tensor::FeatureTensor;
