use super::parse_id;
use crate::domain::{
    fields, into_patch, Comment as DomainComment, CommentChanges, Document, Post as DomainPost,
    PostChanges, User as DomainUser, UserChanges,
};
use crate::error::{ApiError, Result};
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{
    Comment, CreateCommentInput, CreatePostInput, CreateUserInput, Post, UpdateCommentInput,
    UpdatePostInput, UpdateUserInput, User,
};
use crate::observability::metrics;
use crate::storage::{Collection, Filter};
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Root mutation object for GraphQL
///
/// Every precondition is checked before the first write, so a rejected
/// mutation leaves storage untouched. Checks and writes are separate store
/// calls and are not atomic with respect to concurrent requests.
pub struct Mutation;

#[Object]
impl Mutation {
    /// Register a user; the email must not be taken
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> FieldResult<User> {
        let context = ctx.data::<GraphQLContext>()?;
        finish("createUser", create_user(context, input).await)
    }

    /// Update the provided fields of a user
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(default)] input: UpdateUserInput,
    ) -> FieldResult<User> {
        let context = ctx.data::<GraphQLContext>()?;
        finish("updateUser", update_user(context, &id, input).await)
    }

    /// Delete a user; documents referencing it are left as they are
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> FieldResult<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        finish(
            "deleteUser",
            delete_document(context.collections.users.as_ref(), &id).await,
        )
    }

    /// Publish a post for an existing user
    async fn create_post(&self, ctx: &Context<'_>, input: CreatePostInput) -> FieldResult<Post> {
        let context = ctx.data::<GraphQLContext>()?;
        finish("createPost", create_post(context, input).await)
    }

    /// Update the content of a post
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(default)] input: UpdatePostInput,
    ) -> FieldResult<Post> {
        let context = ctx.data::<GraphQLContext>()?;
        let changes = PostChanges {
            content: input.content,
        };
        finish(
            "updatePost",
            update_document(context.collections.posts.as_ref(), &id, &changes).await,
        )
    }

    /// Delete a post; its comments are left as they are
    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> FieldResult<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        finish(
            "deletePost",
            delete_document(context.collections.posts.as_ref(), &id).await,
        )
    }

    /// Comment on an existing post as an existing user
    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        input: CreateCommentInput,
    ) -> FieldResult<Comment> {
        let context = ctx.data::<GraphQLContext>()?;
        finish("createComment", create_comment(context, input).await)
    }

    /// Update the text of a comment
    async fn update_comment(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(default)] input: UpdateCommentInput,
    ) -> FieldResult<Comment> {
        let context = ctx.data::<GraphQLContext>()?;
        let changes = CommentChanges { text: input.text };
        finish(
            "updateComment",
            update_document(context.collections.comments.as_ref(), &id, &changes).await,
        )
    }

    /// Delete a comment
    async fn delete_comment(&self, ctx: &Context<'_>, id: ID) -> FieldResult<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        finish(
            "deleteComment",
            delete_document(context.collections.comments.as_ref(), &id).await,
        )
    }

    /// Record that a user likes a post; liking twice has no further effect
    async fn add_like_to_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        user_id: ID,
    ) -> FieldResult<Post> {
        let context = ctx.data::<GraphQLContext>()?;
        finish(
            "addLikeToPost",
            change_like(context, &post_id, &user_id, LikeChange::Add).await,
        )
    }

    /// Withdraw a user's like from a post
    async fn remove_like_from_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        user_id: ID,
    ) -> FieldResult<Post> {
        let context = ctx.data::<GraphQLContext>()?;
        finish(
            "removeLikeFromPost",
            change_like(context, &post_id, &user_id, LikeChange::Remove).await,
        )
    }
}

/// Record the outcome and convert it into a field result.
fn finish<T, G: From<T>>(operation: &'static str, result: Result<T>) -> FieldResult<G> {
    match result {
        Ok(value) => {
            metrics::mutations::succeeded(operation);
            Ok(value.into())
        }
        Err(e) => {
            warn!("{} rejected: {}", operation, e);
            metrics::mutations::failed(operation, e.code());
            Err(e.extend())
        }
    }
}

async fn require<D: Document>(collection: &dyn Collection<D>, id: Uuid) -> Result<D> {
    collection
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(D::ENTITY, id))
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_password(context: &GraphQLContext, password: String) -> Result<String> {
    let hasher = context.hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::PasswordHash(format!("hashing task failed: {e}")))?
}

/// Hash for a password update, or `None` when `stored` already matches it.
async fn rehash_if_changed(
    context: &GraphQLContext,
    password: String,
    stored: String,
) -> Result<Option<String>> {
    let hasher = context.hasher.clone();
    tokio::task::spawn_blocking(move || {
        if hasher.verify(&password, &stored) {
            Ok(None)
        } else {
            hasher.hash(&password).map(Some)
        }
    })
    .await
    .map_err(|e| ApiError::PasswordHash(format!("hashing task failed: {e}")))?
}

async fn ensure_email_free(
    context: &GraphQLContext,
    email: &str,
    except: Option<Uuid>,
) -> Result<()> {
    let holder = context
        .collections
        .users
        .find_one(&Filter::eq(fields::EMAIL, email))
        .await?;

    match holder {
        Some(user) if user.id != except => Err(ApiError::Conflict(format!(
            "a user with email {email} already exists"
        ))),
        _ => Ok(()),
    }
}

async fn create_user(context: &GraphQLContext, input: CreateUserInput) -> Result<DomainUser> {
    ensure_email_free(context, &input.email, None).await?;
    let password = hash_password(context, input.password).await?;

    let user = context
        .collections
        .users
        .insert(DomainUser::new(input.name, password, input.email))
        .await?;

    info!("Created user {} ({})", user.email, user.id.unwrap_or_default());
    Ok(user)
}

async fn update_user(
    context: &GraphQLContext,
    id: &ID,
    input: UpdateUserInput,
) -> Result<DomainUser> {
    let users = context.collections.users.as_ref();
    let user_id = parse_id(DomainUser::ENTITY, id)?;
    let current = require(users, user_id).await?;

    if let Some(email) = input.email.as_deref() {
        if email != current.email {
            ensure_email_free(context, email, Some(user_id)).await?;
        }
    }
    let password = match input.password {
        Some(password) => rehash_if_changed(context, password, current.password).await?,
        None => None,
    };

    let changes = UserChanges {
        name: input.name,
        password,
        email: input.email,
    };
    let user = users
        .update_fields(user_id, into_patch(&changes)?)
        .await?
        .ok_or_else(|| ApiError::not_found(DomainUser::ENTITY, user_id))?;

    info!("Updated user {}", user_id);
    Ok(user)
}

async fn create_post(context: &GraphQLContext, input: CreatePostInput) -> Result<DomainPost> {
    let author = parse_id(DomainUser::ENTITY, &input.author)?;
    require(context.collections.users.as_ref(), author).await?;

    let post = context
        .collections
        .posts
        .insert(DomainPost::new(input.content, author))
        .await?;

    info!("Created post {} by {}", post.id.unwrap_or_default(), author);
    Ok(post)
}

async fn create_comment(
    context: &GraphQLContext,
    input: CreateCommentInput,
) -> Result<DomainComment> {
    let author = parse_id(DomainUser::ENTITY, &input.author)?;
    let post = parse_id(DomainPost::ENTITY, &input.post)?;
    require(context.collections.users.as_ref(), author).await?;
    require(context.collections.posts.as_ref(), post).await?;

    let comment = context
        .collections
        .comments
        .insert(DomainComment::new(input.text, author, post))
        .await?;

    info!(
        "Created comment {} on post {} by {}",
        comment.id.unwrap_or_default(),
        post,
        author
    );
    Ok(comment)
}

/// Apply whitelisted scalar changes to an existing document.
async fn update_document<D: Document, C: serde::Serialize>(
    collection: &dyn Collection<D>,
    id: &ID,
    changes: &C,
) -> Result<D> {
    let document_id = parse_id(D::ENTITY, id)?;
    let patch = into_patch(changes)?;

    let updated = collection
        .update_fields(document_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found(D::ENTITY, document_id))?;

    info!("Updated {} {}", D::ENTITY, document_id);
    Ok(updated)
}

async fn delete_document<D: Document>(collection: &dyn Collection<D>, id: &ID) -> Result<bool> {
    let document_id = parse_id(D::ENTITY, id)?;

    collection
        .delete_by_id(document_id)
        .await?
        .ok_or_else(|| ApiError::not_found(D::ENTITY, document_id))?;

    info!("Deleted {} {}", D::ENTITY, document_id);
    Ok(true)
}

enum LikeChange {
    Add,
    Remove,
}

async fn change_like(
    context: &GraphQLContext,
    post_id: &ID,
    user_id: &ID,
    change: LikeChange,
) -> Result<DomainPost> {
    let posts = context.collections.posts.as_ref();
    let post_id = parse_id(DomainPost::ENTITY, post_id)?;
    let user_id = parse_id(DomainUser::ENTITY, user_id)?;
    require(posts, post_id).await?;
    require(context.collections.users.as_ref(), user_id).await?;

    let liker = Value::String(user_id.to_string());
    let updated = match change {
        LikeChange::Add => posts.add_to_set(post_id, fields::LIKES, liker).await?,
        LikeChange::Remove => posts.pull(post_id, fields::LIKES, liker).await?,
    }
    .ok_or_else(|| ApiError::not_found(DomainPost::ENTITY, post_id))?;

    info!("Post {} now has {} likes", post_id, updated.likes.len());
    Ok(updated)
}
