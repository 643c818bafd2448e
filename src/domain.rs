use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level field names as they appear in stored documents.
pub mod fields {
    pub const NAME: &str = "name";
    pub const PASSWORD: &str = "password";
    pub const EMAIL: &str = "email";
    pub const CONTENT: &str = "content";
    pub const TEXT: &str = "text";
    pub const AUTHOR: &str = "author";
    pub const POST: &str = "post";
    pub const LIKES: &str = "likes";
}

/// A flat document living in one named collection.
///
/// Identity is assigned by the store on insert; until then `id()` is `None`.
pub trait Document: Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> Option<Uuid>;
    fn set_id(&mut self, id: Uuid);
    fn created_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Option<Uuid>,
    pub name: String,
    /// Argon2 PHC string; the plaintext is never stored.
    pub password: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, password_hash: String, email: String) -> Self {
        Self {
            id: None,
            name,
            password: password_hash,
            email,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: Option<Uuid>,
    pub content: String,
    pub author: Uuid,
    /// Users who liked the post; each user appears at most once.
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(content: String, author: Uuid) -> Self {
        Self {
            id: None,
            content,
            author,
            likes: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Option<Uuid>,
    pub text: String,
    pub author: Uuid,
    pub post: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String, author: Uuid, post: Uuid) -> Self {
        Self {
            id: None,
            text,
            author,
            post,
            created_at: Utc::now(),
        }
    }
}

macro_rules! impl_document {
    ($ty:ty, $collection:literal, $entity:literal) => {
        impl Document for $ty {
            const COLLECTION: &'static str = $collection;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> Option<Uuid> {
                self.id
            }

            fn set_id(&mut self, id: Uuid) {
                self.id = Some(id);
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

impl_document!(User, "users", "User");
impl_document!(Post, "posts", "Post");
impl_document!(Comment, "comments", "Comment");

/// Partial field set applied by `update_fields`: top-level field name to new value.
pub type Patch = serde_json::Map<String, serde_json::Value>;

/// Scalar fields of a user that an update may touch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Already hashed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Turns a changes struct into a patch holding only the provided fields.
pub fn into_patch<T: Serialize>(changes: &T) -> crate::error::Result<Patch> {
    match serde_json::to_value(changes)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(crate::error::ApiError::Invalid(format!(
            "update must be an object, got {other}"
        ))),
    }
}
