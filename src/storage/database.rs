use super::filter::Filter;
use super::traits::Collection;
use crate::db::DatabaseManager;
use crate::domain::{Document, Patch};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use libsql::params::IntoParams;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_DOCUMENTS: &str = "SELECT data FROM documents WHERE collection = ?1";
const ORDER_BY_CREATION: &str = "ORDER BY created_at, id";

/// Collection backed by Turso/libSQL; documents are stored as JSON rows of
/// the shared `documents` table.
pub struct DatabaseCollection<D> {
    db: Arc<DatabaseManager>,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> DatabaseCollection<D> {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self {
            db,
            _document: PhantomData,
        }
    }

    fn to_data(document: &D) -> Result<String> {
        serde_json::to_string(document).map_err(|e| {
            ApiError::database(format!("Failed to serialize {} document: {e}", D::ENTITY))
        })
    }

    fn from_data(data: &str) -> Result<D> {
        serde_json::from_str(data).map_err(|e| {
            ApiError::database(format!("Failed to deserialize {} document: {e}", D::ENTITY))
        })
    }

    fn field_path(field: &str) -> String {
        format!("$.{field}")
    }

    async fn query_documents(&self, sql: &str, params: impl IntoParams) -> Result<Vec<D>> {
        let conn = self.db.get_connection()?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| ApiError::database(format!("Failed to query {}: {e}", D::COLLECTION)))?;

        let mut documents = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ApiError::database(format!("Failed to read row: {e}")))?
        {
            let data: String = row
                .get(0)
                .map_err(|e| ApiError::database(format!("Failed to get data: {e}")))?;
            documents.push(Self::from_data(&data)?);
        }
        Ok(documents)
    }

    async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64> {
        let conn = self.db.get_connection()?;
        conn.execute(sql, params).await.map_err(|e| {
            let message = e.to_string();
            if message.contains("UNIQUE constraint failed") {
                ApiError::Conflict(format!("{} violates a uniqueness constraint", D::ENTITY))
            } else {
                ApiError::database(format!("Failed to write {}: {message}", D::COLLECTION))
            }
        })
    }
}

#[async_trait]
impl<D: Document> Collection<D> for DatabaseCollection<D> {
    async fn find_all(&self) -> Result<Vec<D>> {
        let sql = format!("{SELECT_DOCUMENTS} {ORDER_BY_CREATION}");
        self.query_documents(&sql, libsql::params![D::COLLECTION]).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<D>> {
        let sql = format!("{SELECT_DOCUMENTS} AND id = ?2");
        let documents = self
            .query_documents(&sql, libsql::params![D::COLLECTION, id.to_string()])
            .await?;
        Ok(documents.into_iter().next())
    }

    async fn find_by_filter(&self, filter: &Filter) -> Result<Vec<D>> {
        match filter {
            Filter::Eq { field, value } => {
                let sql = format!(
                    "{SELECT_DOCUMENTS} AND json_extract(data, ?2) = json_extract(?3, '$') {ORDER_BY_CREATION}"
                );
                self.query_documents(
                    &sql,
                    libsql::params![D::COLLECTION, Self::field_path(field), value.to_string()],
                )
                .await
            }
            Filter::Contains { field, value } => {
                let sql = format!(
                    "{SELECT_DOCUMENTS} AND EXISTS (SELECT 1 FROM json_each(documents.data, ?2) \
                     WHERE json_each.value = json_extract(?3, '$')) {ORDER_BY_CREATION}"
                );
                self.query_documents(
                    &sql,
                    libsql::params![D::COLLECTION, Self::field_path(field), value.to_string()],
                )
                .await
            }
            Filter::IdIn(ids) => {
                let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
                let sql = format!(
                    "{SELECT_DOCUMENTS} AND id IN (SELECT value FROM json_each(?2)) {ORDER_BY_CREATION}"
                );
                self.query_documents(&sql, libsql::params![D::COLLECTION, serde_json::to_string(&ids)?])
                    .await
            }
        }
    }

    async fn insert(&self, mut document: D) -> Result<D> {
        let id = Uuid::new_v4();
        document.set_id(id);

        self.execute(
            "INSERT INTO documents (id, collection, data, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, datetime('now'))",
            libsql::params![
                id.to_string(),
                D::COLLECTION,
                Self::to_data(&document)?,
                document.created_at().to_rfc3339()
            ],
        )
        .await?;

        info!("Inserted {} document with id {}", D::COLLECTION, id);
        Ok(document)
    }

    async fn update_fields(&self, id: Uuid, mut patch: Patch) -> Result<Option<D>> {
        // Identity is owned by the store.
        patch.remove("id");
        let affected = self
            .execute(
                "UPDATE documents SET data = json_patch(data, ?3), updated_at = datetime('now') \
                 WHERE collection = ?1 AND id = ?2",
                libsql::params![D::COLLECTION, id.to_string(), Value::Object(patch).to_string()],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }
        debug!("Updated {} document {}", D::COLLECTION, id);
        self.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<D>> {
        let Some(document) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let affected = self
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                libsql::params![D::COLLECTION, id.to_string()],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }
        info!("Deleted {} document {}", D::COLLECTION, id);
        Ok(Some(document))
    }

    async fn add_to_set(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>> {
        self.execute(
            "UPDATE documents SET data = json_insert(data, ?3 || '[#]', json_extract(?4, '$')), \
             updated_at = datetime('now') \
             WHERE collection = ?1 AND id = ?2 \
             AND NOT EXISTS (SELECT 1 FROM json_each(documents.data, ?3) \
                             WHERE json_each.value = json_extract(?4, '$'))",
            libsql::params![
                D::COLLECTION,
                id.to_string(),
                Self::field_path(field),
                value.to_string()
            ],
        )
        .await?;

        self.find_by_id(id).await
    }

    async fn pull(&self, id: Uuid, field: &'static str, value: Value) -> Result<Option<D>> {
        self.execute(
            "UPDATE documents SET data = json_set(data, ?3, json(( \
                 SELECT json_group_array(json_each.value) FROM json_each(documents.data, ?3) \
                 WHERE json_each.value != json_extract(?4, '$')))), \
             updated_at = datetime('now') \
             WHERE collection = ?1 AND id = ?2",
            libsql::params![
                D::COLLECTION,
                id.to_string(),
                Self::field_path(field),
                value.to_string()
            ],
        )
        .await?;

        self.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fields, Post, User};
    use serde_json::json;
    use tempfile::TempDir;

    async fn manager() -> (TempDir, Arc<DatabaseManager>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("social.db");
        let db = DatabaseManager::new(path.to_str().unwrap(), None).await.unwrap();
        db.run_migrations().await.unwrap();
        (dir, Arc::new(db))
    }

    #[tokio::test]
    async fn round_trips_documents_through_json_rows() {
        let (_dir, db) = manager().await;
        let users = DatabaseCollection::<User>::new(db);

        let created = users
            .insert(User::new("Ada".into(), "hash".into(), "a@x.com".into()))
            .await
            .unwrap();
        let found = users.find_by_id(created.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found, created);

        let by_email = users
            .find_one(&Filter::eq(fields::EMAIL, "a@x.com"))
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn unique_email_index_reports_conflict() {
        let (_dir, db) = manager().await;
        let users = DatabaseCollection::<User>::new(db);

        users
            .insert(User::new("Ada".into(), "hash".into(), "a@x.com".into()))
            .await
            .unwrap();
        let err = users
            .insert(User::new("Eve".into(), "hash".into(), "a@x.com".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn likes_use_set_semantics() {
        let (_dir, db) = manager().await;
        let posts = DatabaseCollection::<Post>::new(db);
        let post = posts
            .insert(Post::new("hi".into(), Uuid::new_v4()))
            .await
            .unwrap();
        let id = post.id.unwrap();
        let liker = Uuid::new_v4();

        posts.add_to_set(id, fields::LIKES, json!(liker.to_string())).await.unwrap();
        let liked = posts
            .add_to_set(id, fields::LIKES, json!(liker.to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(liked.likes, vec![liker]);

        let liked_posts = posts
            .find_by_filter(&Filter::contains(fields::LIKES, liker))
            .await
            .unwrap();
        assert_eq!(liked_posts.len(), 1);

        let unliked = posts
            .pull(id, fields::LIKES, json!(liker.to_string()))
            .await
            .unwrap()
            .unwrap();
        assert!(unliked.likes.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_absence() {
        let (_dir, db) = manager().await;
        let posts = DatabaseCollection::<Post>::new(db);
        let missing = Uuid::new_v4();

        assert!(posts.update_fields(missing, Patch::new()).await.unwrap().is_none());
        assert!(posts.delete_by_id(missing).await.unwrap().is_none());

        let post = posts
            .insert(Post::new("hi".into(), Uuid::new_v4()))
            .await
            .unwrap();
        let id = post.id.unwrap();
        let mut patch = Patch::new();
        patch.insert(fields::CONTENT.into(), json!("edited"));
        let updated = posts.update_fields(id, patch).await.unwrap().unwrap();
        assert_eq!(updated.content, "edited");
        assert_eq!(updated.author, post.author);

        assert!(posts.delete_by_id(id).await.unwrap().is_some());
        assert!(posts.find_by_id(id).await.unwrap().is_none());
    }
}
