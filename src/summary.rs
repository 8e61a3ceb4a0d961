//! Summary aggregator: cross-step recap and overall validity.
//!
//! The summary is recomputed from the registry and a store snapshot on every
//! request; nothing here is cached.
//!
//! Overall validity: a funnel nobody has touched is valid. Otherwise every
//! step up to and including the furthest step that has a record must have all
//! of its required fields filled. Steps beyond that point are not yet reached
//! and do not count, so an empty final step alone never invalidates the
//! summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{DisplayProjection, StepDefinition, StepRegistry};
use crate::store::{FILE_NAME_KEY, FieldData};
use crate::values;

/// Metadata of an uploaded file, as shown on the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub preview: Option<String>,
}

/// Recap of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummaryEntry {
    pub slug: String,
    pub label: String,
    pub has_error: bool,
    pub data: Option<String>,
    pub error: Option<String>,
    /// Present only for steps with a file field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info: Option<Option<FileInfo>>,
}

/// The whole-funnel recap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub title: String,
    pub is_valid: bool,
    pub steps: Vec<StepSummaryEntry>,
}

/// Whether any required field of `step` is missing from `data`.
pub fn has_missing_required(step: &StepDefinition, data: &FieldData) -> bool {
    step.required_fields()
        .any(|f| values::is_missing(data, &f.name))
}

/// Build the summary from the registry and every stored record.
pub fn summarize(
    registry: &StepRegistry,
    records: &HashMap<String, FieldData>,
) -> RegistrationSummary {
    let empty = FieldData::new();

    let steps: Vec<StepSummaryEntry> = registry
        .ordered()
        .iter()
        .map(|step| summarize_step(step, records.get(&step.slug).unwrap_or(&empty)))
        .collect();

    let reached = registry
        .ordered()
        .iter()
        .rposition(|step| records.contains_key(&step.slug));

    let is_valid = match reached {
        None => true,
        Some(last) => steps[..=last].iter().all(|entry| !entry.has_error),
    };

    RegistrationSummary {
        title: registry.title().to_string(),
        is_valid,
        steps,
    }
}

fn summarize_step(step: &StepDefinition, data: &FieldData) -> StepSummaryEntry {
    let has_error = has_missing_required(step, data);

    let file_info = step
        .file_fields()
        .next()
        .map(|field| data.get(&field.name).and_then(|v| file_info(v, data)));

    StepSummaryEntry {
        slug: step.slug.clone(),
        label: step.summary.label.clone(),
        has_error,
        data: project(&step.summary.display, data),
        error: has_error.then(|| step.summary.error_message.clone()),
        file_info,
    }
}

/// Collapse a record into its display string.
fn project(display: &DisplayProjection, data: &FieldData) -> Option<String> {
    match display {
        DisplayProjection::Join { fields, separator } => {
            let parts = fields
                .iter()
                .map(|name| data.get(name).and_then(values::display_string))
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(separator))
        }
        DisplayProjection::Field { name } => data.get(name).and_then(values::display_string),
        DisplayProjection::FileName { field, fallback } => {
            let value = data.get(field).filter(|v| !values::is_blank(v))?;
            data.get(FILE_NAME_KEY)
                .and_then(Value::as_str)
                .or_else(|| values::file_name(value).filter(|_| value.is_object()))
                .map(str::to_string)
                .or_else(|| fallback.clone())
        }
    }
}

fn file_info(value: &Value, data: &FieldData) -> Option<FileInfo> {
    if values::is_blank(value) {
        return None;
    }
    let name = data
        .get(FILE_NAME_KEY)
        .and_then(Value::as_str)
        .or_else(|| values::file_name(value).filter(|_| value.is_object()))?
        .to_string();
    Some(FileInfo {
        name,
        size: values::file_size(value)
            .flatten()
            .map(|s| s.round() as u64)
            .unwrap_or(0),
        mime_type: value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        preview: value
            .get("preview")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
