//! Task module
//!
//! This module contains task-related types, the repository trait and its
//! two storage backends.

pub mod filter;
mod memory_store;
mod model;
mod postgres_store;
mod repository;

pub use memory_store::InMemoryTaskStore;
pub use model::*;
pub use postgres_store::{PostgresOptions, PostgresTaskStore};
pub use repository::TaskRepository;
