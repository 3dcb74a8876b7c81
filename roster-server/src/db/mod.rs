//! Database layer - the persistence collaborator behind the resource handlers
//!
//! # Design Principles
//!
//! - One [`Repository`] contract, two backends (PostgreSQL, in-memory)
//! - Course joins are a single query per page, no N+1
//! - Sort columns come from a whitelist, never from raw input
//! - Rely on DB constraints for referential integrity

pub mod pool;
pub mod migrations;
pub mod repo;
pub mod postgres;
pub mod memory;

pub use pool::{create_pool, create_pool_with_options};
pub use repo::{DbError, Repository};
pub use postgres::{PgRepository, PgResource};
pub use memory::{MemoryDatabase, MemoryRepository, MemoryResource};
