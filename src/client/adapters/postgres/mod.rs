//! `PostgreSQL` adapters for client persistence.

mod models;
mod repository;
mod schema;

pub use repository::{ClientPgPool, PostgresClientRepository, PostgresDocumentStore};
