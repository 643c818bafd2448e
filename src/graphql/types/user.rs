use crate::domain::{fields, User as DomainUser};
use crate::error::ApiError;
use crate::graphql::schema::GraphQLContext;
use crate::storage::Filter;
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// Value returned in place of the stored credential.
pub const REDACTED: &str = "[redacted]";

/// GraphQL representation of a User
#[derive(Clone)]
pub struct User {
    pub inner: DomainUser,
}

impl From<DomainUser> for User {
    fn from(user: DomainUser) -> Self {
        Self { inner: user }
    }
}

impl User {
    fn user_id(&self) -> FieldResult<uuid::Uuid> {
        Ok(self.inner.id.ok_or("User ID not available")?)
    }
}

#[Object]
impl User {
    /// The unique identifier for the user
    async fn id(&self) -> ID {
        ID(self.inner.id.unwrap_or_default().to_string())
    }

    /// Display name
    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Kept for schema compatibility; the stored hash is never exposed.
    #[graphql(deprecation = "Credentials are never returned")]
    async fn password(&self) -> &str {
        REDACTED
    }

    /// Email address, unique across users
    async fn email(&self) -> &str {
        &self.inner.email
    }

    /// When the user was created
    async fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.created_at
    }

    /// Posts authored by this user
    async fn posts(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::post::Post>> {
        let context = ctx.data::<GraphQLContext>()?;
        let filter = Filter::eq(fields::AUTHOR, self.user_id()?);

        match context.collections.posts.find_by_filter(&filter).await {
            Ok(posts) => Ok(posts.into_iter().map(|p| p.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Comments authored by this user
    async fn comments(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::comment::Comment>> {
        let context = ctx.data::<GraphQLContext>()?;
        let filter = Filter::eq(fields::AUTHOR, self.user_id()?);

        match context.collections.comments.find_by_filter(&filter).await {
            Ok(comments) => Ok(comments.into_iter().map(|c| c.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Posts this user has liked
    async fn liked_posts(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::post::Post>> {
        let context = ctx.data::<GraphQLContext>()?;
        let filter = Filter::contains(fields::LIKES, self.user_id()?);

        context
            .collections
            .posts
            .find_by_filter(&filter)
            .await
            .map(|posts| posts.into_iter().map(|p| p.into()).collect())
            .map_err(|e: ApiError| e.extend())
    }
}
