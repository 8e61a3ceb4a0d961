//! Response shapes of the step service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{FieldDefinition, StepDefinition};
use crate::store::FieldData;
use crate::validation::FieldErrors;

/// Asset type of every step today.
pub const FORM_ASSET: &str = "form";

/// What the client needs to render a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAssets {
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: Vec<FieldDefinition>,
    pub validation: BTreeMap<String, Vec<String>>,
}

/// A step definition combined with its stored data and sequence position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub total_steps: usize,
    pub current_step: u32,
    pub title: String,
    pub slug: String,
    pub assets: StepAssets,
    /// Every declared field (null when never submitted), overlaid with the
    /// stored record.
    pub data: FieldData,
}

impl StepView {
    pub fn build(step: &StepDefinition, total_steps: usize, stored: &FieldData) -> Self {
        let mut data: FieldData = step
            .fields
            .iter()
            .map(|f| (f.name.clone(), Value::Null))
            .collect();
        data.extend(stored.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            total_steps,
            current_step: step.ordinal,
            title: step.title.clone(),
            slug: step.slug.clone(),
            assets: StepAssets {
                kind: FORM_ASSET.to_string(),
                fields: step.fields.clone(),
                validation: step.validation.clone(),
            },
            data,
        }
    }
}

/// Result of a submission. Failed validation is reported here, not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    #[serde(flatten)]
    pub step: StepView,
    pub next_slug: Option<String>,
    pub previous_slug: Option<String>,
    pub valid: bool,
    pub errors: FieldErrors,
}

/// Entry of the step listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutline {
    pub slug: String,
    pub title: String,
    pub current_step: u32,
}
