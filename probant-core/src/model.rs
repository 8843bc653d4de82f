//! Model collaborators: prompt templates and the text-generation interface.

use crate::dataset::Dataset;
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt template with named `{placeholder}` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Build a template, checking that every declared variable actually
    /// appears as a `{variable}` placeholder.
    pub fn new(template: impl Into<String>, input_variables: &[&str]) -> Result<Self, ScanError> {
        let template = template.into();
        for var in input_variables {
            let placeholder = format!("{{{var}}}");
            if !template.contains(&placeholder) {
                return Err(ScanError::prompt(format!(
                    "template has no '{placeholder}' placeholder"
                )));
            }
        }
        Ok(Self {
            template,
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Render the template against one row of variable bindings.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, ScanError> {
        let mut rendered = self.template.clone();
        for var in &self.input_variables {
            let value = values.get(var.as_str()).ok_or_else(|| {
                ScanError::prompt(format!("missing value for template variable '{var}'"))
            })?;
            rendered = rendered.replace(&format!("{{{var}}}"), value);
        }
        Ok(rendered)
    }
}

/// A text-generation model under scan.
///
/// Predictions are batched: one output per input row, order-preserving.
/// There is no retry or timeout layer; failures propagate to the caller.
pub trait TextGenerationModel: Send + Sync {
    /// Identifier used in reports and issues.
    fn name(&self) -> &str;

    /// A reconfigured copy of this model that renders `prompt` for each
    /// input row before generating.
    fn with_prompt(&self, prompt: PromptTemplate) -> Box<dyn TextGenerationModel>;

    /// Generate one output per dataset row, aligned with row order.
    fn predict(&self, dataset: &Dataset) -> Result<Vec<String>, ScanError>;
}
