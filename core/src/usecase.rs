//! Application use cases
//!
//! Forwards CRUD calls to [`TaskService`] and adds a few preset listings.

use chrono::{DateTime, Utc};

use crate::service::TaskService;
use crate::task::{
    CreateTaskRequest, FilterOptions, Priority, SortField, SortOrder, Status, Task,
    UpdateTaskRequest,
};
use crate::{Context, Result};

#[derive(Clone)]
pub struct TaskUseCase {
    service: TaskService,
}

impl TaskUseCase {
    pub fn new(service: TaskService) -> Self {
        Self { service }
    }

    pub async fn create_task(&self, ctx: &Context, req: CreateTaskRequest) -> Result<Task> {
        self.service.create_task(ctx, req).await
    }

    pub async fn get_task(&self, ctx: &Context, id: &str) -> Result<Task> {
        self.service.get_task(ctx, id).await
    }

    pub async fn get_tasks(&self, ctx: &Context, filter: Option<&FilterOptions>) -> Result<Vec<Task>> {
        self.service.get_tasks(ctx, filter).await
    }

    pub async fn update_task(&self, ctx: &Context, req: UpdateTaskRequest) -> Result<Task> {
        self.service.update_task(ctx, req).await
    }

    pub async fn delete_task(&self, ctx: &Context, id: &str) -> Result<()> {
        self.service.delete_task(ctx, id).await
    }

    pub async fn toggle_task_status(&self, ctx: &Context, id: &str) -> Result<Task> {
        self.service.toggle_task_status(ctx, id).await
    }

    /// Tasks with `status`, newest first
    pub async fn get_tasks_by_status(&self, ctx: &Context, status: Status) -> Result<Vec<Task>> {
        let filter = FilterOptions::default()
            .with_status(status)
            .sorted_by(SortField::CreatedAt, SortOrder::Desc);
        self.service.get_tasks(ctx, Some(&filter)).await
    }

    /// Tasks with `priority`, newest first
    pub async fn get_tasks_by_priority(&self, ctx: &Context, priority: Priority) -> Result<Vec<Task>> {
        let filter = FilterOptions::default()
            .with_priority(priority)
            .sorted_by(SortField::CreatedAt, SortOrder::Desc);
        self.service.get_tasks(ctx, Some(&filter)).await
    }

    /// Tasks created within `from..=to`, newest first
    pub async fn get_tasks_by_date_range(
        &self,
        ctx: &Context,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        let filter = FilterOptions::default()
            .with_date_from(from)
            .with_date_to(to)
            .sorted_by(SortField::CreatedAt, SortOrder::Desc);
        self.service.get_tasks(ctx, Some(&filter)).await
    }

    /// Active tasks created up to now, earliest due date first.
    ///
    /// The cutoff applies to `created_at`, not `due_date`.
    pub async fn get_overdue_tasks(&self, ctx: &Context) -> Result<Vec<Task>> {
        let filter = FilterOptions::default()
            .with_status(Status::Active)
            .with_date_to(Utc::now())
            .sorted_by(SortField::DueDate, SortOrder::Asc);
        self.service.get_tasks(ctx, Some(&filter)).await
    }
}
