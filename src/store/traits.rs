//! Backend-agnostic `StepStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::registry::StepDefinition;

use super::FieldData;

/// Holder of per-step submitted data, keyed by step slug.
///
/// Implementations must apply [`StepStore::merge`] atomically: a concurrent
/// reader of the same step sees either the pre- or the post-merge record.
#[async_trait]
pub trait StepStore: Send + Sync {
    /// Stored data for a step; empty when nothing was submitted yet.
    async fn get(&self, slug: &str) -> Result<FieldData, StoreError>;

    /// Merge `partial` into the step's record (creating it on first use),
    /// attach derived fields, and return the resulting record.
    async fn merge(&self, step: &StepDefinition, partial: FieldData)
    -> Result<FieldData, StoreError>;

    /// Consistent view of every record that exists.
    async fn snapshot(&self) -> Result<HashMap<String, FieldData>, StoreError>;
}
