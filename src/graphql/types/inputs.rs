use async_graphql::{InputObject, ID};

#[derive(InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub password: String,
    pub email: String,
}

#[derive(InputObject)]
pub struct CreatePostInput {
    pub content: String,
    /// Id of the authoring user
    pub author: ID,
}

#[derive(InputObject)]
pub struct CreateCommentInput {
    pub text: String,
    /// Id of the authoring user
    pub author: ID,
    /// Id of the post being commented on
    pub post: ID,
}

/// Omitted fields are left unchanged.
#[derive(InputObject, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(InputObject, Default)]
pub struct UpdatePostInput {
    pub content: Option<String>,
}

#[derive(InputObject, Default)]
pub struct UpdateCommentInput {
    pub text: Option<String>,
}
