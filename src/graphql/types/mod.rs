pub mod comment;
pub mod inputs;
pub mod post;
pub mod user;

pub use comment::Comment;
pub use inputs::{
    CreateCommentInput, CreatePostInput, CreateUserInput, UpdateCommentInput, UpdatePostInput,
    UpdateUserInput,
};
pub use post::Post;
pub use user::User;

use crate::domain::Document;
use crate::error::ApiError;
use crate::graphql::loaders::DocumentLoader;
use crate::observability::metrics;
use async_graphql::dataloader::DataLoader;
use async_graphql::{ErrorExtensions, FieldResult};
use tracing::warn;
use uuid::Uuid;

/// Resolve a single-reference field through its loader.
///
/// A referenced document that no longer exists is a `NOT_FOUND` error on this
/// field only; the schema declares these fields nullable so siblings survive.
pub(crate) async fn resolve_reference<D: Document>(
    loader: &DataLoader<DocumentLoader<D>>,
    owner: &'static str,
    field: &'static str,
    id: Uuid,
) -> FieldResult<D> {
    let loaded = loader
        .load_one(id)
        .await
        .map_err(|message| ApiError::database(message).extend())?;

    loaded.ok_or_else(|| {
        warn!("{}.{} references missing {} {}", owner, field, D::ENTITY, id);
        metrics::references::dangling(owner, field);
        ApiError::DanglingReference {
            entity: owner,
            field,
            id: id.to_string(),
        }
        .extend()
    })
}
