//! Step service: façade callers talk to.
//!
//! Composes the registry, the injected store, the validator and the
//! summary aggregator. Each call is independent: service trusts only the
//! slug it is given and keeps no notion of a "current" step.
//!
//! The rule vocabulary is audited when the service is built, so a submit
//! can merge first and then validate exactly the record it stored.

pub mod view;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{FunnelError, Result};
use crate::registry::{Sequencer, StepDefinition, StepRegistry};
use crate::store::{FILE_NAME_KEY, FieldData, StepStore};
use crate::summary::{self, RegistrationSummary};
use crate::validation::{RuleContext, Validator};

pub use view::{StepAssets, StepOutline, StepView, SubmitOutcome};

pub struct StepService {
    registry: Arc<StepRegistry>,
    store: Arc<dyn StepStore>,
    validator: Arc<Validator>,
}

impl StepService {
    /// Fails when the catalog uses a rule the validator cannot interpret.
    pub fn new(
        registry: Arc<StepRegistry>,
        store: Arc<dyn StepStore>,
        validator: Arc<Validator>,
    ) -> Result<Self> {
        validator.audit(&registry)?;
        Ok(Self {
            registry,
            store,
            validator,
        })
    }

    /// Ordered outline of every step.
    pub fn list_steps(&self) -> Vec<StepOutline> {
        self.registry
            .ordered()
            .iter()
            .map(|s| StepOutline {
                slug: s.slug.clone(),
                title: s.title.clone(),
                current_step: s.ordinal,
            })
            .collect()
    }

    /// Definition, stored data and position of a step.
    pub async fn get_step(&self, slug: &str) -> Result<StepView> {
        let step = self.registry.get(slug)?;
        let stored = self.store.get(slug).await?;
        Ok(StepView::build(step, self.registry.len(), &stored))
    }

    /// Merge submitted data into a step and report validation and sequencing.
    pub async fn submit_step(&self, slug: &str, payload: Value) -> Result<SubmitOutcome> {
        self.submit_step_at(slug, payload, &RuleContext::now()).await
    }

    /// [`Self::submit_step`] with an explicit evaluation context.
    pub async fn submit_step_at(
        &self,
        slug: &str,
        payload: Value,
        ctx: &RuleContext,
    ) -> Result<SubmitOutcome> {
        let step = self.registry.get(slug)?;
        let Value::Object(raw) = payload else {
            return Err(FunnelError::BadPayload(
                "step data must be a JSON object".to_string(),
            ));
        };
        let partial = declared_fields_only(step, raw);

        // Errors describe the record this merge produced, even when another
        // submission to the same step lands concurrently.
        let merged = self.store.merge(step, partial).await?;
        let errors = self.validator.validate_step(step, &merged, ctx)?;

        let sequencer = Sequencer::new(&self.registry);
        let next_slug = sequencer.next(slug)?.map(str::to_string);
        let previous_slug = sequencer.previous(slug)?.map(str::to_string);
        let valid = errors.is_empty();

        info!(
            slug = %slug,
            valid,
            failed_fields = errors.len(),
            next = next_slug.as_deref().unwrap_or("-"),
            "Step submitted"
        );

        Ok(SubmitOutcome {
            step: StepView::build(step, self.registry.len(), &merged),
            next_slug,
            previous_slug,
            valid,
            errors,
        })
    }

    /// Recap of every step and overall validity.
    pub async fn get_summary(&self) -> Result<RegistrationSummary> {
        let records = self.store.snapshot().await?;
        let summary = summary::summarize(&self.registry, &records);
        debug!(is_valid = summary.is_valid, reached = records.len(), "Summary computed");
        Ok(summary)
    }
}

/// Drop keys that are neither declared fields nor the derived file name.
fn declared_fields_only(step: &StepDefinition, raw: FieldData) -> FieldData {
    let accepts_file_name = step.file_fields().next().is_some();
    raw.into_iter()
        .filter(|(key, _)| {
            let keep = step.has_field(key) || (accepts_file_name && key == FILE_NAME_KEY);
            if !keep {
                warn!(slug = %step.slug, field = %key, "Dropping undeclared field");
            }
            keep
        })
        .collect()
}
