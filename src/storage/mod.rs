pub mod filter;
pub mod in_memory;
pub mod traits;

#[cfg(feature = "db")]
pub mod database;

pub use filter::Filter;
pub use in_memory::InMemoryCollection;
pub use traits::Collection;

#[cfg(feature = "db")]
pub use database::DatabaseCollection;

use crate::domain::{Comment, Post, User};
use std::sync::Arc;

/// Handles to the three collections, built once at startup and passed down
/// explicitly to everything that touches storage.
#[derive(Clone)]
pub struct Collections {
    pub users: Arc<dyn Collection<User>>,
    pub posts: Arc<dyn Collection<Post>>,
    pub comments: Arc<dyn Collection<Comment>>,
}

impl Collections {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryCollection::new()),
            posts: Arc::new(InMemoryCollection::new()),
            comments: Arc::new(InMemoryCollection::new()),
        }
    }

    #[cfg(feature = "db")]
    pub fn database(db: Arc<crate::db::DatabaseManager>) -> Self {
        Self {
            users: Arc::new(DatabaseCollection::new(db.clone())),
            posts: Arc::new(DatabaseCollection::new(db.clone())),
            comments: Arc::new(DatabaseCollection::new(db)),
        }
    }
}
