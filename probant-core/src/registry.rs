//! Detector registry — explicit registration of scan detectors.
//!
//! Detectors are registered at startup by explicit calls; nothing is
//! registered as a side effect of linking a crate in.

use crate::dataset::Dataset;
use crate::error::ScanError;
use crate::issue::Issue;
use crate::model::TextGenerationModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Trait all detectors implement.
pub trait Detector: Send + Sync {
    /// Unique identifier for this detector.
    fn id(&self) -> &str;

    /// Capability tags used for scan filtering.
    fn tags(&self) -> &[&str];

    /// Human-readable description of what this detector probes.
    fn description(&self) -> &str;

    /// Inspect the model/dataset pair, yielding zero or more issues.
    fn run(
        &self,
        model: &dyn TextGenerationModel,
        dataset: &Dataset,
    ) -> Result<Vec<Issue>, ScanError>;
}

/// Registry mapping detector ids to instances.
pub struct DetectorRegistry {
    detectors: HashMap<String, Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }

    /// Register a detector. Errors if the id is already taken.
    pub fn register(&mut self, detector: Arc<dyn Detector>) -> Result<(), ScanError> {
        let id = detector.id().to_string();
        if self.detectors.contains_key(&id) {
            return Err(ScanError::DetectorAlreadyRegistered { id });
        }
        debug!(detector = %id, "Registering detector");
        self.detectors.insert(id, detector);
        Ok(())
    }

    /// Unregister a detector by id.
    pub fn unregister(&mut self, id: &str) -> Result<(), ScanError> {
        if self.detectors.remove(id).is_none() {
            return Err(ScanError::DetectorNotFound { id: id.to_string() });
        }
        debug!(detector = %id, "Unregistered detector");
        Ok(())
    }

    /// Get a detector by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Detector>> {
        self.detectors.get(id).cloned()
    }

    /// All registered ids, sorted for stable output.
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.detectors.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Detectors carrying the given tag.
    pub fn with_tag(&self, tag: &str) -> Vec<Arc<dyn Detector>> {
        self.detectors
            .values()
            .filter(|d| d.tags().contains(&tag))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Detector>> {
        self.detectors.values()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
