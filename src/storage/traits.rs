use super::filter::Filter;
use crate::domain::{Document, Patch};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// One named collection of flat documents.
///
/// Absence is reported as `Ok(None)`, never as an error. Every call touches
/// only this collection; keeping references consistent across collections is
/// up to the caller. Multi-document results are ordered by creation time.
#[async_trait]
pub trait Collection<D: Document>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<D>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<D>>;
    async fn find_by_filter(&self, filter: &Filter) -> Result<Vec<D>>;

    /// Assigns a fresh identity and stores the document.
    async fn insert(&self, document: D) -> Result<D>;

    /// Overwrites the given top-level fields; the identity is never touched.
    async fn update_fields(&self, id: Uuid, patch: Patch) -> Result<Option<D>>;

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<D>>;

    /// Appends `value` to the array `field` unless already present, atomically.
    async fn add_to_set(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>>;

    /// Removes every occurrence of `value` from the array `field`, atomically.
    async fn pull(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_by_filter(&Filter::IdIn(ids.to_vec())).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>> {
        Ok(self.find_by_filter(filter).await?.into_iter().next())
    }
}
