//! # storage-adapters
//!
//! Implementations of the repository ports. The in-memory store is always
//! available; PostgreSQL is compiled in with the `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
