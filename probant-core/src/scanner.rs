//! Scan orchestrator — drives registered detectors and assembles a report.

use crate::config::ScanConfig;
use crate::dataset::Dataset;
use crate::error::ScanError;
use crate::issue::Issue;
use crate::model::TextGenerationModel;
use crate::registry::{Detector, DetectorRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// A detector that failed during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorFailure {
    pub detector: String,
    pub error: String,
}

/// Outcome of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub model: String,
    pub dataset: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    pub failures: Vec<DetectorFailure>,
}

impl ScanReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Runs registered detectors over a model/dataset pair, sequentially.
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Run every selected detector and assemble a report.
    ///
    /// A detector error is logged and recorded as a failure; with
    /// `fail_fast` set it propagates instead.
    pub fn run(
        &self,
        registry: &DetectorRegistry,
        model: &dyn TextGenerationModel,
        dataset: &Dataset,
    ) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let mut selected: Vec<Arc<dyn Detector>> = registry
            .iter()
            .filter(|d| self.selected(d.as_ref()))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.id().cmp(b.id()));

        info!(
            detectors = selected.len(),
            model = %model.name(),
            dataset = %dataset.name(),
            "Starting scan"
        );

        let mut issues = Vec::new();
        let mut failures = Vec::new();
        for detector in &selected {
            match detector.run(model, dataset) {
                Ok(found) => {
                    info!(detector = %detector.id(), issues = found.len(), "Detector finished");
                    issues.extend(found);
                }
                Err(err) if self.config.fail_fast => return Err(err),
                Err(err) => {
                    warn!(detector = %detector.id(), error = %err, "Detector failed");
                    failures.push(DetectorFailure {
                        detector: detector.id().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(ScanReport {
            scan_id: Uuid::new_v4(),
            model: model.name().to_string(),
            dataset: dataset.name().to_string(),
            started_at,
            finished_at: Utc::now(),
            issues,
            failures,
        })
    }

    fn selected(&self, detector: &dyn Detector) -> bool {
        self.config.only_tags.is_empty()
            || detector
                .tags()
                .iter()
                .any(|tag| self.config.only_tags.iter().any(|only| only == tag))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
