//! In-memory step store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::registry::StepDefinition;

use super::traits::StepStore;
use super::{FieldData, merge_record};

/// Step records kept in process memory.
///
/// A single `RwLock` serializes merges; readers never observe a half-applied
/// merge because the whole merge runs under one write guard.
#[derive(Default)]
pub struct InMemoryStepStore {
    records: RwLock<HashMap<String, FieldData>>,
}

impl InMemoryStepStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StepStore for InMemoryStepStore {
    async fn get(&self, slug: &str) -> Result<FieldData, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge(
        &self,
        step: &StepDefinition,
        partial: FieldData,
    ) -> Result<FieldData, StoreError> {
        let mut records = self.records.write().await;
        let record = records.entry(step.slug.clone()).or_default();
        merge_record(record, step, partial);
        debug!(slug = %step.slug, fields = record.len(), "Step record merged");
        Ok(record.clone())
    }

    async fn snapshot(&self) -> Result<HashMap<String, FieldData>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
