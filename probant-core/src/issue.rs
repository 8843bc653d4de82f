//! The issue contract shared by all detectors.

use serde::{Deserialize, Serialize};

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Major,
    Medium,
    Minor,
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            IssueLevel::Major => "major",
            IssueLevel::Medium => "medium",
            IssueLevel::Minor => "minor",
        };
        write!(f, "{label}")
    }
}

/// One concrete input/output pair backing an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueExample {
    /// The input that triggered the behavior (for generation probes, the
    /// perturbed feature value).
    pub input: String,
    /// The model output, as shown to a reader.
    pub output: String,
    /// Detector-specific annotation of the output.
    pub label: String,
}

/// A structured finding describing a detected model weakness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Name of the scanned model.
    pub model: String,
    /// Name of the dataset the scan was invoked with.
    pub dataset: String,
    /// Issue family, e.g. "Gender Bias".
    pub group: String,
    pub level: IssueLevel,
    /// Behavior domain, e.g. "Stereotype Generation".
    pub domain: String,
    pub description: String,
    /// Summary metric, already formatted for display.
    pub metric: String,
    /// Deviation summary; empty when the detector has none.
    pub deviation: String,
    /// Relative weight among issues, in `[0, 1]`.
    pub importance: f64,
    pub examples: Vec<IssueExample>,
}

impl Issue {
    /// The first `n` examples, for display surfaces that truncate.
    pub fn top_examples(&self, n: usize) -> &[IssueExample] {
        &self.examples[..self.examples.len().min(n)]
    }
}
