pub mod config;
pub mod credentials;
#[cfg(feature = "db")]
pub mod db;
pub mod domain;
pub mod error;
pub mod graphql;
pub mod observability;
pub mod server;
pub mod storage;
