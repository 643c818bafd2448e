pub mod loaders;
pub mod resolvers;
pub mod schema;
pub mod types;

pub use schema::{create_schema, create_schema_with_hasher, GraphQLContext, GraphQLSchema};
