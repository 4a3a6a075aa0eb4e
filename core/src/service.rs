//! Task business rules
//!
//! Validates requests, assigns identity and timestamps, and applies the
//! status toggle. All persistence goes through [`TaskRepository`].

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::task::{CreateTaskRequest, FilterOptions, Status, Task, TaskRepository, UpdateTaskRequest};
use crate::{Context, Error, Result};

/// Timestamps are kept at microsecond precision so both backends agree.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Matches the `title` column width of the PostgreSQL schema
const MAX_TITLE_CHARS: usize = 255;

fn validate_title(title: &str) -> Result<()> {
    require(title, "title")?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

/// Refresh `updated_at` without letting it move backwards
fn touch(task: &mut Task) {
    task.updated_at = now().max(task.updated_at);
}

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repo
    }

    pub async fn create_task(&self, ctx: &Context, req: CreateTaskRequest) -> Result<Task> {
        validate_title(&req.title)?;

        let now = now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: Status::Active,
            due_date: req.due_date,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .create(ctx, &task)
            .await
            .map_err(|e| e.context("failed to create task"))?;

        tracing::info!(task_id = %task.id, "created task");
        Ok(task)
    }

    pub async fn get_task(&self, ctx: &Context, id: &str) -> Result<Task> {
        require(id, "id")?;

        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.context("failed to get task"))
    }

    pub async fn get_tasks(&self, ctx: &Context, filter: Option<&FilterOptions>) -> Result<Vec<Task>> {
        self.repo
            .get_all(ctx, filter)
            .await
            .map_err(|e| e.context("failed to list tasks"))
    }

    /// Overwrite every mutable field from `req`. `id` and `created_at` stay.
    pub async fn update_task(&self, ctx: &Context, req: UpdateTaskRequest) -> Result<Task> {
        require(&req.id, "id")?;
        validate_title(&req.title)?;

        let mut task = self
            .repo
            .get_by_id(ctx, &req.id)
            .await
            .map_err(|e| e.context("failed to get task"))?;

        task.title = req.title;
        task.description = req.description;
        task.priority = req.priority;
        task.status = req.status;
        task.due_date = req.due_date;
        touch(&mut task);

        self.repo
            .update(ctx, &task)
            .await
            .map_err(|e| e.context("failed to update task"))?;

        tracing::info!(task_id = %task.id, "updated task");
        Ok(task)
    }

    pub async fn delete_task(&self, ctx: &Context, id: &str) -> Result<()> {
        require(id, "id")?;

        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.context("failed to get task"))?;

        self.repo
            .delete(ctx, id)
            .await
            .map_err(|e| e.context("failed to delete task"))?;

        tracing::info!(task_id = %id, "deleted task");
        Ok(())
    }

    pub async fn toggle_task_status(&self, ctx: &Context, id: &str) -> Result<Task> {
        require(id, "id")?;

        let mut task = self
            .repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.context("failed to get task"))?;

        task.status = task.status.toggled();
        touch(&mut task);

        self.repo
            .update(ctx, &task)
            .await
            .map_err(|e| e.context("failed to update task"))?;

        tracing::info!(task_id = %task.id, status = ?task.status, "toggled task status");
        Ok(task)
    }
}
