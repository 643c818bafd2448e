use crate::credentials::{Argon2Hasher, CredentialHasher};
use crate::domain::{Post, User};
use crate::graphql::loaders::DocumentLoader;
use crate::graphql::resolvers::{Mutation, Query};
use crate::storage::Collections;
use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};
use std::sync::Arc;

/// GraphQL context containing shared application state
pub struct GraphQLContext {
    pub collections: Collections,
    pub hasher: Arc<dyn CredentialHasher>,
    pub user_loader: DataLoader<DocumentLoader<User>>,
    pub post_loader: DataLoader<DocumentLoader<Post>>,
}

impl GraphQLContext {
    pub fn new(collections: Collections, hasher: Arc<dyn CredentialHasher>) -> Self {
        let user_loader = DocumentLoader::new(collections.users.clone());
        let post_loader = DocumentLoader::new(collections.posts.clone());

        Self {
            collections,
            hasher,
            user_loader,
            post_loader,
        }
    }
}

/// The complete GraphQL schema
pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create a new GraphQL schema with the given storage and the default Argon2 hasher
pub fn create_schema(collections: Collections) -> GraphQLSchema {
    create_schema_with_hasher(collections, Arc::new(Argon2Hasher::new()))
}

pub fn create_schema_with_hasher(
    collections: Collections,
    hasher: Arc<dyn CredentialHasher>,
) -> GraphQLSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(GraphQLContext::new(collections, hasher))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdl_exposes_every_operation() {
        let sdl = create_schema(Collections::in_memory()).sdl();
        for name in [
            "users: [User!]!",
            "user(id: ID!): User",
            "posts: [Post!]!",
            "comment(id: ID!): Comment",
            "createUser(input: CreateUserInput!): User!",
            "deleteComment(id: ID!): Boolean!",
            "addLikeToPost(postId: ID!, userId: ID!): Post!",
            "removeLikeFromPost(postId: ID!, userId: ID!): Post!",
            "likedPosts: [Post!]!",
        ] {
            assert!(sdl.contains(name), "missing `{name}` in SDL");
        }
    }
}
