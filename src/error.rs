use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Dangling reference: {entity}.{field} points at missing {id}")]
    DanglingReference {
        entity: &'static str,
        field: &'static str,
        id: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ApiError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        ApiError::Database {
            message: message.into(),
        }
    }

    /// Stable machine-readable code surfaced in `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } | ApiError::DanglingReference { .. } => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Invalid(_) => "INVALID",
            ApiError::PasswordHash(_) => "PASSWORD_HASH",
            ApiError::Json(_)
            | ApiError::Toml(_)
            | ApiError::Io(_)
            | ApiError::Config(_)
            | ApiError::Database { .. } => "INTERNAL",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_separate_absence_from_conflict() {
        assert_eq!(ApiError::not_found("User", "x").code(), "NOT_FOUND");
        assert_eq!(ApiError::Conflict("email".into()).code(), "CONFLICT");
        assert_eq!(ApiError::Invalid("id".into()).code(), "INVALID");
        assert_eq!(ApiError::database("boom").code(), "INTERNAL");
    }

    #[test]
    fn extension_carries_code_and_message() {
        let err = ApiError::not_found("Post", "abc").extend();
        assert_eq!(err.message, "Post not found: abc");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("NOT_FOUND")));
    }
}
