use crate::domain::Document;
use crate::storage::Collection;
use async_graphql::dataloader::{DataLoader, Loader};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// DataLoader batching single-reference lookups into one "id in list" query
pub struct DocumentLoader<D: Document> {
    collection: Arc<dyn Collection<D>>,
}

impl<D: Document> DocumentLoader<D> {
    pub fn new(collection: Arc<dyn Collection<D>>) -> DataLoader<Self> {
        DataLoader::new(Self { collection }, tokio::spawn)
    }
}

#[async_trait]
impl<D: Document> Loader<Uuid> for DocumentLoader<D> {
    type Value = D;
    type Error = String;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let documents = self
            .collection
            .find_by_ids(keys)
            .await
            .map_err(|e| e.to_string())?;

        let mut map = HashMap::new();
        for document in documents {
            if let Some(id) = document.id() {
                map.insert(id, document);
            }
        }

        Ok(map)
    }
}
