//! PostgreSQL task storage implementation
//!
//! One `tasks` table keyed by id, with secondary indexes on the filter and
//! sort columns:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id VARCHAR(36) PRIMARY KEY,
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     priority INTEGER NOT NULL DEFAULT 0,
//!     status INTEGER NOT NULL DEFAULT 0,
//!     due_date TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Every operation is a single statement. Concurrency is left to the
//! database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::model::{FilterOptions, Priority, SortField, SortOrder, Status, Task};
use super::repository::TaskRepository;
use crate::{Context, Error, Result};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tasks (
        id VARCHAR(36) PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        priority INTEGER NOT NULL DEFAULT 0,
        status INTEGER NOT NULL DEFAULT 0,
        due_date TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)",
];

const SELECT_TASKS: &str =
    "SELECT id, title, description, priority, status, due_date, created_at, updated_at FROM tasks";

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    priority: i32,
    status: i32,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        let priority = Priority::try_from(i64::from(row.priority))
            .map_err(|e| Error::Storage(format!("corrupt row {}: {}", row.id, e)))?;
        let status = Status::try_from(i64::from(row.status))
            .map_err(|e| Error::Storage(format!("corrupt row {}: {}", row.id, e)))?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            priority,
            status,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn priority_column(priority: Priority) -> i32 {
    match priority {
        Priority::Low => 0,
        Priority::Medium => 1,
        Priority::High => 2,
    }
}

fn status_column(status: Status) -> i32 {
    match status {
        Status::Active => 0,
        Status::Completed => 1,
    }
}

fn storage_error(action: &str, err: sqlx::Error) -> Error {
    Error::Storage(format!("failed to {}: {}", action, err))
}

/// ORDER BY clause for a filter. Column names come from a closed set, never
/// from the request text.
fn order_clause(filter: Option<&FilterOptions>) -> String {
    let Some((field, order)) = filter.and_then(|f| f.sort_field().map(|field| (field, f.order())))
    else {
        return "created_at DESC".to_string();
    };

    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    match field {
        SortField::Title => format!("title COLLATE \"C\" {}", direction),
        SortField::Priority => format!("priority {}", direction),
        SortField::DueDate => format!("due_date {} NULLS LAST", direction),
        SortField::CreatedAt => format!("created_at {}", direction),
    }
}

/// Build the listing query with every filter value bound as a parameter
fn build_list_query(filter: Option<&FilterOptions>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_TASKS);

    if let Some(filter) = filter {
        let mut separator = " WHERE ";
        if let Some(status) = filter.status {
            builder
                .push(separator)
                .push("status = ")
                .push_bind(status_column(status));
            separator = " AND ";
        }
        if let Some(priority) = filter.priority {
            builder
                .push(separator)
                .push("priority = ")
                .push_bind(priority_column(priority));
            separator = " AND ";
        }
        if let Some(from) = filter.date_from {
            builder.push(separator).push("created_at >= ").push_bind(from);
            separator = " AND ";
        }
        if let Some(to) = filter.date_to {
            builder.push(separator).push("created_at <= ").push_bind(to);
        }
    }

    builder.push(" ORDER BY ").push(order_clause(filter));
    builder
}

/// Task store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Connect, verify the connection and ensure the schema exists
    pub async fn connect(url: &str, options: &PostgresOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| storage_error("connect to database", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not touched.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("create schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskStore {
    async fn create(&self, ctx: &Context, task: &Task) -> Result<()> {
        ctx.run(async {
            sqlx::query(
                "INSERT INTO tasks (id, title, description, priority, status, due_date, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(&task.id)
            .bind(&task.title)
            .bind(task.description.as_deref())
            .bind(priority_column(task.priority))
            .bind(status_column(task.status))
            .bind(task.due_date)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return Error::AlreadyExists(format!(
                            "task with ID {} already exists",
                            task.id
                        ));
                    }
                }
                storage_error("insert task", e)
            })
        })
        .await?;

        tracing::debug!(task_id = %task.id, "inserted task row");
        Ok(())
    }

    async fn get_by_id(&self, ctx: &Context, id: &str) -> Result<Task> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, TaskRow>(
                    "SELECT id, title, description, priority, status, due_date, created_at, updated_at
                     FROM tasks WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("query task", e))
            })
            .await?;

        ctx.check()?;
        row.ok_or_else(|| Error::task_not_found(id))?.try_into()
    }

    async fn get_all(&self, ctx: &Context, filter: Option<&FilterOptions>) -> Result<Vec<Task>> {
        let rows = ctx
            .run(async {
                let mut builder = build_list_query(filter);
                builder
                    .build_query_as::<TaskRow>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| storage_error("query tasks", e))
            })
            .await?;

        ctx.check()?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn update(&self, ctx: &Context, task: &Task) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query(
                    "UPDATE tasks
                     SET title = $2, description = $3, priority = $4, status = $5, due_date = $6, updated_at = $7
                     WHERE id = $1",
                )
                .bind(&task.id)
                .bind(&task.title)
                .bind(task.description.as_deref())
                .bind(priority_column(task.priority))
                .bind(status_column(task.status))
                .bind(task.due_date)
                .bind(task.updated_at)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("update task", e))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::task_not_found(&task.id));
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| storage_error("delete task", e))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::task_not_found(id));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
