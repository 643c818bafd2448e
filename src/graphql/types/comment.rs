use crate::domain::Comment as DomainComment;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of a Comment
#[derive(Clone)]
pub struct Comment {
    pub inner: DomainComment,
}

impl From<DomainComment> for Comment {
    fn from(comment: DomainComment) -> Self {
        Self { inner: comment }
    }
}

#[Object]
impl Comment {
    /// The unique identifier for the comment
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// Body of the comment
    async fn text(&self) -> &str {
        &self.inner.text
    }

    /// When the comment was created
    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }

    /// The user who wrote the comment
    async fn author(&self, ctx: &Context<'_>) -> FieldResult<Option<super::user::User>> {
        let context = ctx.data::<GraphQLContext>()?;
        let author =
            super::resolve_reference(&context.user_loader, "Comment", "author", self.inner.author)
                .await?;
        Ok(Some(author.into()))
    }

    /// The post this comment belongs to
    async fn post(&self, ctx: &Context<'_>) -> FieldResult<Option<super::post::Post>> {
        let context = ctx.data::<GraphQLContext>()?;
        let post =
            super::resolve_reference(&context.post_loader, "Comment", "post", self.inner.post)
                .await?;
        Ok(Some(post.into()))
    }
}
