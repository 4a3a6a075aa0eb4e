//! JSON boundary over [`TaskUseCase`]
//!
//! Each operation takes request text, decodes it, invokes the use case and
//! returns the result encoded as JSON text. Malformed input is rejected with
//! [`Error::Decode`] before any business logic runs.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::task::{CreateTaskRequest, FilterOptions, Priority, Status, UpdateTaskRequest};
use crate::usecase::TaskUseCase;
use crate::{Context, Error, Result};

fn decode<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::Decode(format!("invalid {} format: {}", what, e)))
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn parse_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|e| Error::Decode(format!("invalid {} timestamp: {}", field, e)))
}

#[derive(Clone)]
pub struct TaskHandler {
    use_case: TaskUseCase,
}

impl TaskHandler {
    pub fn new(use_case: TaskUseCase) -> Self {
        Self { use_case }
    }

    pub async fn create_task(&self, ctx: &Context, req_json: &str) -> Result<String> {
        let req: CreateTaskRequest = decode(req_json, "request")?;
        let task = self.use_case.create_task(ctx, req).await?;
        encode(&task)
    }

    pub async fn get_task(&self, ctx: &Context, id: &str) -> Result<String> {
        let task = self.use_case.get_task(ctx, id).await?;
        encode(&task)
    }

    /// Blank `filter_json` or `null` means no filter at all
    pub async fn get_tasks(&self, ctx: &Context, filter_json: &str) -> Result<String> {
        let filter: Option<FilterOptions> = if filter_json.trim().is_empty() {
            None
        } else {
            decode(filter_json, "filter")?
        };

        let tasks = self.use_case.get_tasks(ctx, filter.as_ref()).await?;
        encode(&tasks)
    }

    pub async fn update_task(&self, ctx: &Context, req_json: &str) -> Result<String> {
        let req: UpdateTaskRequest = decode(req_json, "request")?;
        let task = self.use_case.update_task(ctx, req).await?;
        encode(&task)
    }

    pub async fn delete_task(&self, ctx: &Context, id: &str) -> Result<()> {
        self.use_case.delete_task(ctx, id).await
    }

    pub async fn toggle_task_status(&self, ctx: &Context, id: &str) -> Result<String> {
        let task = self.use_case.toggle_task_status(ctx, id).await?;
        encode(&task)
    }

    pub async fn get_tasks_by_status(&self, ctx: &Context, status: i64) -> Result<String> {
        let status = Status::try_from(status)?;
        let tasks = self.use_case.get_tasks_by_status(ctx, status).await?;
        encode(&tasks)
    }

    pub async fn get_tasks_by_priority(&self, ctx: &Context, priority: i64) -> Result<String> {
        let priority = Priority::try_from(priority)?;
        let tasks = self.use_case.get_tasks_by_priority(ctx, priority).await?;
        encode(&tasks)
    }

    /// `from` and `to` are RFC 3339 timestamps
    pub async fn get_tasks_by_date_range(&self, ctx: &Context, from: &str, to: &str) -> Result<String> {
        let from = parse_timestamp(from, "from")?;
        let to = parse_timestamp(to, "to")?;
        let tasks = self.use_case.get_tasks_by_date_range(ctx, from, to).await?;
        encode(&tasks)
    }

    pub async fn get_overdue_tasks(&self, ctx: &Context) -> Result<String> {
        let tasks = self.use_case.get_overdue_tasks(ctx).await?;
        encode(&tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::TaskService;
    use crate::task::{InMemoryTaskStore, Task};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn handler() -> TaskHandler {
        TaskHandler::new(TaskUseCase::new(TaskService::new(Arc::new(
            InMemoryTaskStore::new(),
        ))))
    }

    fn ctx() -> Context {
        Context::background()
    }

    async fn create(handler: &TaskHandler, body: Value) -> Task {
        let raw = handler.create_task(&ctx(), &body.to_string()).await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_encoded_task() {
        let handler = handler();
        let raw = handler
            .create_task(&ctx(), r#"{"title":"Buy milk","priority":0}"#)
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["status"], 0);
        assert!(value["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(value.get("dueDate").is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let handler = handler();
        let err = handler.create_task(&ctx(), "{not json").await.unwrap_err();
        match err {
            Error::Decode(msg) => assert!(msg.starts_with("invalid request format")),
            e => panic!("Expected Decode error, got: {:?}", e),
        }

        let err = handler.get_tasks(&ctx(), r#"{"status":"completed"}"#).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        // nothing was stored
        let raw = handler.get_tasks(&ctx(), "").await.unwrap();
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn test_get_tasks_with_filter() {
        let handler = handler();
        create(&handler, json!({ "title": "low", "priority": 0 })).await;
        create(&handler, json!({ "title": "high", "priority": 2 })).await;
        create(&handler, json!({ "title": "medium", "priority": 1 })).await;

        let raw = handler
            .get_tasks(&ctx(), r#"{"sortBy":"priority","sortOrder":"desc"}"#)
            .await
            .unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);

        let raw = handler.get_tasks_by_priority(&ctx(), 2).await.unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_null_filter_lists_everything_newest_first() {
        let handler = handler();
        let first = create(&handler, json!({ "title": "first" })).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = create(&handler, json!({ "title": "second", "priority": null })).await;
        assert_eq!(second.priority, Priority::Low);

        let raw = handler.get_tasks(&ctx(), " null ").await.unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_and_toggle() {
        let handler = handler();
        let task = create(&handler, json!({ "title": "draft" })).await;

        let body = json!({
            "id": task.id,
            "title": "final",
            "priority": 2,
            "status": 1,
            "dueDate": "2030-01-01T00:00:00Z"
        });
        let raw = handler.update_task(&ctx(), &body.to_string()).await.unwrap();
        let updated: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(updated["title"], "final");
        assert_eq!(updated["status"], 1);
        assert_eq!(updated["dueDate"], "2030-01-01T00:00:00Z");

        let raw = handler.toggle_task_status(&ctx(), &task.id).await.unwrap();
        let toggled: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(toggled["status"], 0);
    }

    #[tokio::test]
    async fn test_out_of_range_ordinals_are_rejected() {
        let handler = handler();
        assert!(matches!(
            handler.get_tasks_by_status(&ctx(), 5).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            handler.get_tasks_by_priority(&ctx(), -1).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_missing_ids() {
        let handler = handler();
        let task = create(&handler, json!({ "title": "gone soon" })).await;

        handler.delete_task(&ctx(), &task.id).await.unwrap();
        assert!(handler.get_task(&ctx(), &task.id).await.unwrap_err().is_not_found());
        assert!(handler.delete_task(&ctx(), &task.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_date_range_parses_timestamps() {
        let handler = handler();
        create(&handler, json!({ "title": "now" })).await;

        let raw = handler
            .get_tasks_by_date_range(&ctx(), "2000-01-01T00:00:00Z", "2999-01-01T00:00:00+02:00")
            .await
            .unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(tasks.len(), 1);

        let err = handler
            .get_tasks_by_date_range(&ctx(), "yesterday", "2999-01-01T00:00:00Z")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
