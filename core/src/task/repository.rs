//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{FilterOptions, Task};
use crate::{Context, Result};

/// Repository interface for task CRUD operations.
///
/// Implementations return owned copies; callers never hold references into
/// the store.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, ctx: &Context, task: &Task) -> Result<()>;

    /// Get a task by ID, or `NotFound`
    async fn get_by_id(&self, ctx: &Context, id: &str) -> Result<Task>;

    /// Get all tasks matching `filter`, ordered by its sort options
    async fn get_all(&self, ctx: &Context, filter: Option<&FilterOptions>) -> Result<Vec<Task>>;

    /// Replace an existing task, or `NotFound`
    async fn update(&self, ctx: &Context, task: &Task) -> Result<()>;

    /// Delete a task by ID, or `NotFound`
    async fn delete(&self, ctx: &Context, id: &str) -> Result<()>;

    /// Release held resources. Safe to call more than once.
    async fn close(&self) -> Result<()>;

    /// Short backend name for logs and health reporting
    fn backend(&self) -> &'static str;
}
