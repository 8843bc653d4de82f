//! Configuration types for the probant crates.

use serde::{Deserialize, Serialize};

/// Scan orchestration configuration.
///
/// Detector-internal decision thresholds are not configurable here; each
/// detector fixes its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Run only detectors carrying at least one of these tags. Empty runs all.
    #[serde(default)]
    pub only_tags: Vec<String>,
    /// Propagate the first detector failure instead of recording it in the report.
    #[serde(default)]
    pub fail_fast: bool,
}
