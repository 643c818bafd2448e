pub mod mutation;
pub mod query;

pub use mutation::Mutation;
pub use query::Query;

use crate::error::{ApiError, Result};
use async_graphql::ID;
use uuid::Uuid;

/// Convert an opaque GraphQL id into a storage identity.
pub(crate) fn parse_id(entity: &'static str, id: &ID) -> Result<Uuid> {
    Uuid::parse_str(id.as_str())
        .map_err(|e| ApiError::Invalid(format!("malformed {entity} id '{}': {e}", id.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("User", &ID::from("not-a-uuid")).unwrap_err();
        assert_eq!(err.code(), "INVALID");

        let id = Uuid::new_v4();
        assert_eq!(parse_id("User", &ID::from(id.to_string())).unwrap(), id);
    }
}
