//! In-memory task storage implementation
//!
//! Keeps every task in a map guarded by a reader/writer lock. Nothing
//! survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::filter;
use super::model::{FilterOptions, Task};
use super::repository::TaskRepository;
use crate::{Context, Error, Result};

/// Map-backed task store
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn create(&self, ctx: &Context, task: &Task) -> Result<()> {
        ctx.check()?;
        {
            let mut tasks = self.tasks.write().await;
            ctx.check()?;
            if tasks.contains_key(&task.id) {
                return Err(Error::AlreadyExists(format!(
                    "task with ID {} already exists",
                    task.id
                )));
            }
            tasks.insert(task.id.clone(), task.clone());
        }
        tracing::debug!(task_id = %task.id, "stored task in memory");
        Ok(())
    }

    async fn get_by_id(&self, ctx: &Context, id: &str) -> Result<Task> {
        ctx.check()?;
        let task = {
            let tasks = self.tasks.read().await;
            tasks.get(id).cloned()
        };
        ctx.check()?;
        task.ok_or_else(|| Error::task_not_found(id))
    }

    async fn get_all(&self, ctx: &Context, filter: Option<&FilterOptions>) -> Result<Vec<Task>> {
        ctx.check()?;
        let selected = {
            let tasks = self.tasks.read().await;
            filter::apply(tasks.values(), filter)
        };
        ctx.check()?;
        Ok(selected)
    }

    async fn update(&self, ctx: &Context, task: &Task) -> Result<()> {
        ctx.check()?;
        {
            let mut tasks = self.tasks.write().await;
            ctx.check()?;
            match tasks.get_mut(&task.id) {
                Some(stored) => *stored = task.clone(),
                None => return Err(Error::task_not_found(&task.id)),
            }
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        ctx.check()?;
        let removed = {
            let mut tasks = self.tasks.write().await;
            ctx.check()?;
            tasks.remove(id).is_some()
        };
        if !removed {
            return Err(Error::task_not_found(id));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
