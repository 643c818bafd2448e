use super::filter::Filter;
use super::traits::Collection;
use crate::domain::{Document, Patch};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// In-memory collection for development/testing
pub struct InMemoryCollection<D> {
    documents: Arc<Mutex<HashMap<Uuid, D>>>,
}

impl<D> Default for InMemoryCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> InMemoryCollection<D> {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, D>>> {
        self.documents
            .lock()
            .map_err(|_| ApiError::database("in-memory collection lock poisoned"))
    }
}

impl<D: Document> InMemoryCollection<D> {
    fn sorted(mut documents: Vec<D>) -> Vec<D> {
        documents.sort_by_key(|d| (d.created_at(), d.id()));
        documents
    }

    /// Rewrites one document through its JSON form while the lock is held.
    fn modify(&self, id: Uuid, edit: impl FnOnce(&mut serde_json::Map<String, Value>)) -> Result<Option<D>> {
        let mut documents = self.lock()?;
        let Some(current) = documents.get_mut(&id) else {
            return Ok(None);
        };

        let mut value = serde_json::to_value(&*current)?;
        if let Value::Object(map) = &mut value {
            edit(map);
            // Identity is owned by the store.
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        let updated: D = serde_json::from_value(value)?;
        *current = updated.clone();
        Ok(Some(updated))
    }
}

#[async_trait]
impl<D: Document> Collection<D> for InMemoryCollection<D> {
    async fn find_all(&self) -> Result<Vec<D>> {
        let documents = self.lock()?;
        Ok(Self::sorted(documents.values().cloned().collect()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<D>> {
        let documents = self.lock()?;
        Ok(documents.get(&id).cloned())
    }

    async fn find_by_filter(&self, filter: &Filter) -> Result<Vec<D>> {
        let documents = self.lock()?;
        let mut matching = Vec::new();
        for (id, document) in documents.iter() {
            let value = serde_json::to_value(document)?;
            if filter.matches(*id, &value) {
                matching.push(document.clone());
            }
        }
        Ok(Self::sorted(matching))
    }

    async fn insert(&self, mut document: D) -> Result<D> {
        let id = Uuid::new_v4();
        document.set_id(id);

        let mut documents = self.lock()?;
        documents.insert(id, document.clone());

        debug!("Inserted {} document with id {}", D::COLLECTION, id);
        Ok(document)
    }

    async fn update_fields(&self, id: Uuid, patch: Patch) -> Result<Option<D>> {
        let updated = self.modify(id, |map| {
            for (field, value) in patch {
                map.insert(field, value);
            }
        })?;
        if updated.is_some() {
            debug!("Updated {} document {}", D::COLLECTION, id);
        }
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<D>> {
        let mut documents = self.lock()?;
        let removed = documents.remove(&id);
        if removed.is_some() {
            debug!("Deleted {} document {}", D::COLLECTION, id);
        }
        Ok(removed)
    }

    async fn add_to_set(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>> {
        self.modify(id, |map| {
            let items = map
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = items {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        })
    }

    async fn pull(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>> {
        self.modify(id, |map| {
            if let Some(Value::Array(items)) = map.get_mut(field) {
                items.retain(|item| item != &value);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fields, Post, User};
    use serde_json::json;

    fn user(email: &str) -> User {
        User::new("Ada".into(), "hash".into(), email.into())
    }

    #[tokio::test]
    async fn insert_assigns_fresh_identity() {
        let users = InMemoryCollection::<User>::new();
        let first = users.insert(user("a@x.com")).await.unwrap();
        let second = users.insert(user("b@x.com")).await.unwrap();

        assert!(first.id.is_some());
        assert_ne!(first.id, second.id);
        assert_eq!(users.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_keeps_created_at_and_orders_by_it() {
        let users = InMemoryCollection::<User>::new();
        let mut older = user("old@x.com");
        older.created_at -= chrono::Duration::seconds(60);
        let stamp = older.created_at;

        users.insert(user("new@x.com")).await.unwrap();
        let stored = users.insert(older).await.unwrap();

        assert_eq!(stored.created_at, stamp);
        let emails: Vec<_> = users
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["old@x.com", "new@x.com"]);
    }

    #[tokio::test]
    async fn absence_is_not_an_error() {
        let users = InMemoryCollection::<User>::new();
        let missing = Uuid::new_v4();

        assert!(users.find_by_id(missing).await.unwrap().is_none());
        assert!(users.delete_by_id(missing).await.unwrap().is_none());
        assert!(users
            .update_fields(missing, Patch::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_fields_keeps_untouched_fields_and_identity() {
        let users = InMemoryCollection::<User>::new();
        let created = users.insert(user("a@x.com")).await.unwrap();
        let id = created.id.unwrap();

        let mut patch = Patch::new();
        patch.insert(fields::NAME.into(), json!("Grace"));
        patch.insert("id".into(), json!(Uuid::new_v4().to_string()));
        let updated = users.update_fields(id, patch).await.unwrap().unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn find_by_filter_matches_field_values() {
        let users = InMemoryCollection::<User>::new();
        users.insert(user("a@x.com")).await.unwrap();
        users.insert(user("b@x.com")).await.unwrap();

        let found = users
            .find_one(&Filter::eq(fields::EMAIL, "b@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email, "b@x.com");
    }

    #[tokio::test]
    async fn add_to_set_and_pull_manage_likes() {
        let posts = InMemoryCollection::<Post>::new();
        let created = posts.insert(Post::new("hi".into(), Uuid::new_v4())).await.unwrap();
        let id = created.id.unwrap();
        let liker = json!(Uuid::new_v4().to_string());

        posts.add_to_set(id, fields::LIKES, liker.clone()).await.unwrap();
        let liked = posts.add_to_set(id, fields::LIKES, liker.clone()).await.unwrap().unwrap();
        assert_eq!(liked.likes.len(), 1);

        let unliked = posts.pull(id, fields::LIKES, liker).await.unwrap().unwrap();
        assert!(unliked.likes.is_empty());
    }

    #[tokio::test]
    async fn find_by_ids_skips_unknown_ids() {
        let users = InMemoryCollection::<User>::new();
        let a = users.insert(user("a@x.com")).await.unwrap().id.unwrap();

        let found = users.find_by_ids(&[a, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(users.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
