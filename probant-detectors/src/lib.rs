//! # probant-detectors — built-in detectors for the Probant scanner
//!
//! Each detector implements `probant_core::Detector` and is registered
//! explicitly at startup via [`register_builtin_detectors`]; nothing is
//! registered as a side effect of linking this crate in.

pub mod gender_bias;
pub mod stats;

// Re-exports
pub use gender_bias::{GENDER_BIAS_DETECTOR_ID, GenderBiasDetector};

use probant_core::{DetectorRegistry, ScanError};
use std::sync::Arc;

/// Register every built-in detector with the registry.
pub fn register_builtin_detectors(registry: &mut DetectorRegistry) -> Result<(), ScanError> {
    registry.register(Arc::new(GenderBiasDetector::new()))?;
    tracing::info!(detectors = registry.len(), "Registered built-in detectors");
    Ok(())
}
