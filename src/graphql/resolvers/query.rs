use super::parse_id;
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Comment, Post, User};
use crate::observability::metrics;
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};
use tracing::debug;

/// Root query object for GraphQL
pub struct Query;

#[Object]
impl Query {
    /// Get all users
    async fn users(&self, ctx: &Context<'_>) -> FieldResult<Vec<User>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("users");

        match context.collections.users.find_all().await {
            Ok(users) => Ok(users.into_iter().map(|u| u.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get a user by ID
    async fn user(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<User>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("user");
        let user_id = parse_id("User", &id).map_err(|e| e.extend())?;
        debug!("Looking up user {}", user_id);

        match context.collections.users.find_by_id(user_id).await {
            Ok(user) => Ok(user.map(|u| u.into())),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get all posts
    async fn posts(&self, ctx: &Context<'_>) -> FieldResult<Vec<Post>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("posts");

        match context.collections.posts.find_all().await {
            Ok(posts) => Ok(posts.into_iter().map(|p| p.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get a post by ID
    async fn post(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Post>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("post");
        let post_id = parse_id("Post", &id).map_err(|e| e.extend())?;
        debug!("Looking up post {}", post_id);

        match context.collections.posts.find_by_id(post_id).await {
            Ok(post) => Ok(post.map(|p| p.into())),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get all comments
    async fn comments(&self, ctx: &Context<'_>) -> FieldResult<Vec<Comment>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("comments");

        match context.collections.comments.find_all().await {
            Ok(comments) => Ok(comments.into_iter().map(|c| c.into()).collect()),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get a comment by ID
    async fn comment(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Comment>> {
        let context = ctx.data::<GraphQLContext>()?;
        metrics::queries::served("comment");
        let comment_id = parse_id("Comment", &id).map_err(|e| e.extend())?;
        debug!("Looking up comment {}", comment_id);

        match context.collections.comments.find_by_id(comment_id).await {
            Ok(comment) => Ok(comment.map(|c| c.into())),
            Err(e) => Err(e.extend()),
        }
    }
}
