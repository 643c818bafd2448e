use crate::domain::{fields, Post as DomainPost};
use crate::graphql::schema::GraphQLContext;
use crate::storage::Filter;
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// GraphQL representation of a Post
#[derive(Clone)]
pub struct Post {
    pub inner: DomainPost,
}

impl From<DomainPost> for Post {
    fn from(post: DomainPost) -> Self {
        Self { inner: post }
    }
}

#[Object]
impl Post {
    /// The unique identifier for the post
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// Body of the post
    async fn content(&self) -> &str {
        &self.inner.content
    }

    /// When the post was created
    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }

    /// The user who wrote the post; null with an error if that user was deleted
    async fn author(&self, ctx: &Context<'_>) -> FieldResult<Option<super::user::User>> {
        let context = ctx.data::<GraphQLContext>()?;
        let author =
            super::resolve_reference(&context.user_loader, "Post", "author", self.inner.author)
                .await?;
        Ok(Some(author.into()))
    }

    /// Comments left on this post
    async fn comments(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::comment::Comment>> {
        let context = ctx.data::<GraphQLContext>()?;
        let post_id = self.inner.id.ok_or("Post ID not available")?;

        match context
            .collections
            .comments
            .find_by_filter(&Filter::eq(fields::POST, post_id))
            .await
        {
            Ok(comments) => Ok(comments.into_iter().map(|c| c.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Users who liked this post; likes from deleted users are skipped
    async fn likes(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::user::User>> {
        let context = ctx.data::<GraphQLContext>()?;

        match context.collections.users.find_by_ids(&self.inner.likes).await {
            Ok(users) => Ok(users.into_iter().map(|u| u.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }
}
