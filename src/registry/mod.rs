//! Step registry: static catalog of funnel steps.
//!
//! The registry is built once (from the built-in catalog or a JSON catalog
//! file), checked for structural invariants, and shared read-only behind an
//! `Arc`. Lookups by slug are O(1); traversal order comes from each step's
//! explicit `ordinal`, never from declaration order.

pub mod catalog;
pub mod model;
pub mod sequencer;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{CatalogError, FunnelError};

pub use model::{
    DisplayProjection, FieldDefinition, FieldKind, FieldOption, StepDefinition, SummarySpec,
};
pub use sequencer::Sequencer;

/// Catalog document accepted by [`StepRegistry::from_json_str`].
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    title: String,
    steps: Vec<StepDefinition>,
}

/// Read-only catalog of step definitions, sorted by ordinal.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    title: String,
    steps: Vec<StepDefinition>,
    index: HashMap<String, usize>,
}

impl StepRegistry {
    /// Build a registry, sorting by ordinal and checking invariants.
    pub fn new(
        title: impl Into<String>,
        mut steps: Vec<StepDefinition>,
    ) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }

        steps.sort_by_key(|s| s.ordinal);

        let total = steps.len();
        let mut index = HashMap::with_capacity(total);
        for (position, step) in steps.iter().enumerate() {
            if step.ordinal as usize != position + 1 {
                return Err(CatalogError::OrdinalGap {
                    expected_max: total,
                    position: position + 1,
                    found: step.ordinal,
                });
            }
            if index.insert(step.slug.clone(), position).is_some() {
                return Err(CatalogError::DuplicateSlug(step.slug.clone()));
            }
            check_fields(step)?;
        }

        Ok(Self {
            title: title.into(),
            steps,
            index,
        })
    }

    /// Parse a JSON catalog `{ "title": ..., "steps": [...] }`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::new(doc.title, doc.steps)
    }

    /// Load a JSON catalog from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&raw)?;
        info!(path = %path.display(), steps = registry.len(), "Loaded step catalog");
        Ok(registry)
    }

    /// Summary title of the funnel.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Look up a step by slug.
    pub fn get(&self, slug: &str) -> Result<&StepDefinition, FunnelError> {
        self.index
            .get(slug)
            .map(|&i| &self.steps[i])
            .ok_or_else(|| FunnelError::NotFound {
                slug: slug.to_string(),
            })
    }

    /// Steps in ordinal order.
    pub fn ordered(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> &StepDefinition {
        &self.steps[0]
    }

    pub fn last(&self) -> &StepDefinition {
        &self.steps[self.steps.len() - 1]
    }

    /// Zero-based position of a step in ordinal order.
    pub(crate) fn position(&self, slug: &str) -> Option<usize> {
        self.index.get(slug).copied()
    }

    /// Step at a zero-based position in ordinal order.
    pub(crate) fn at(&self, position: usize) -> Option<&StepDefinition> {
        self.steps.get(position)
    }
}

fn check_fields(step: &StepDefinition) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for field in &step.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(CatalogError::DuplicateField {
                slug: step.slug.clone(),
                field: field.name.clone(),
            });
        }
    }
    for field in step.validation.keys() {
        if !seen.contains(field.as_str()) {
            return Err(CatalogError::UnknownRuleField {
                slug: step.slug.clone(),
                field: field.clone(),
            });
        }
    }
    Ok(())
}
