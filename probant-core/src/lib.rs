//! # probant-core — framework surface for the Probant model scanner
//!
//! This crate defines the contracts the scan pipeline is built from:
//! datasets with declared column semantics, the text-generation model
//! interface, the issue contract detectors report through, the explicit
//! detector registry, and the orchestrator that drives a scan end to end.
//!
//! Detector implementations live in `probant-detectors`; this crate knows
//! nothing about any particular probe.

pub mod config;
pub mod dataset;
pub mod error;
pub mod issue;
pub mod model;
pub mod registry;
pub mod scanner;

// Re-exports
pub use config::ScanConfig;
pub use dataset::{ColumnKind, Dataset};
pub use error::ScanError;
pub use issue::{Issue, IssueExample, IssueLevel};
pub use model::{PromptTemplate, TextGenerationModel};
pub use registry::{Detector, DetectorRegistry};
pub use scanner::{DetectorFailure, ScanReport, Scanner};
