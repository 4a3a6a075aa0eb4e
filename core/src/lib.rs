//! Core library for the todo backend
//!
//! This crate contains the task model and business logic:
//! - Task model, filters and sorting
//! - Storage backends (in-memory, PostgreSQL)
//! - Service, use case and JSON handler layers

pub mod context;
pub mod error;
pub mod handler;
pub mod service;
pub mod task;
pub mod usecase;

pub use context::Context;
pub use error::Error;
pub use handler::TaskHandler;
pub use service::TaskService;
pub use usecase::TaskUseCase;

pub type Result<T> = std::result::Result<T, Error>;
