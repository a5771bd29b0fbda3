use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::user_path;
use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::transport::Transport;
use crate::types::{TaskId, UserId};

/// A task as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for task creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// List filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn tasks_path(user_id: &UserId) -> String {
    user_path(user_id, "tasks")
}

fn task_path(user_id: &UserId, id: TaskId) -> String {
    user_path(user_id, &format!("tasks/{id}"))
}

pub async fn list<T: Transport>(gateway: &Gateway<T>, filter: TaskFilter) -> ApiResult<Vec<Task>> {
    let user_id = gateway.require_user()?;
    let endpoint = format!("{}?status={filter}", tasks_path(&user_id));
    gateway.get(&endpoint).await
}

pub async fn create<T: Transport>(gateway: &Gateway<T>, task: &NewTask) -> ApiResult<Task> {
    let user_id = gateway.require_user()?;
    gateway.post(&tasks_path(&user_id), task).await
}

pub async fn update<T: Transport>(
    gateway: &Gateway<T>,
    id: TaskId,
    update: &TaskUpdate,
) -> ApiResult<Task> {
    let user_id = gateway.require_user()?;
    gateway.put(&task_path(&user_id, id), update).await
}

pub async fn delete<T: Transport>(gateway: &Gateway<T>, id: TaskId) -> ApiResult<()> {
    let user_id = gateway.require_user()?;
    let _: JsonValue = gateway.delete(&task_path(&user_id, id)).await?;
    Ok(())
}

/// Flip the completion flag.
pub async fn toggle_complete<T: Transport>(gateway: &Gateway<T>, id: TaskId) -> ApiResult<Task> {
    let user_id = gateway.require_user()?;
    let endpoint = format!("{}/complete", task_path(&user_id, id));
    gateway.patch(&endpoint, &serde_json::json!({})).await
}

#[cfg(test)]
mod tests {
    use http::Method;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::gateway::test_support::gateway;
    use crate::types::{AuthToken, Session, User};

    const TASK: &str = r#"{"id": 7, "user_id": "u1", "title": "Buy milk",
        "description": "", "completed": false,
        "created_at": "2024-05-01T10:00:00", "updated_at": "2024-05-01T10:00:00"}"#;

    fn sign_in(gateway: &Gateway<impl Transport>, user_id: &str) {
        gateway
            .session()
            .login(Session::new(
                AuthToken::new("tok-1"),
                User::new(user_id, "Ada", "a@b.com"),
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn list_uses_status_filter() {
        let (gateway, transport, _) = gateway();
        sign_in(&gateway, "u1");
        transport.reply(200, &format!("[{TASK}]"));

        let tasks = list(&gateway, TaskFilter::Pending).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, TaskId(7));
        assert_eq!(
            transport.sent()[0].url.as_str(),
            "https://api.example.com/api/u1/tasks?status=pending"
        );
    }

    #[tokio::test]
    async fn create_update_toggle_delete_hit_expected_routes() {
        let (gateway, transport, _) = gateway();
        sign_in(&gateway, "u1");
        transport
            .reply(201, TASK)
            .reply(200, TASK)
            .reply(200, TASK)
            .reply(200, r#"{"message": "Task deleted"}"#);

        create(&gateway, &NewTask::new("Buy milk")).await.unwrap();
        let changes = TaskUpdate {
            title: Some("Buy oat milk".into()),
            ..TaskUpdate::default()
        };
        update(&gateway, TaskId(7), &changes).await.unwrap();
        toggle_complete(&gateway, TaskId(7)).await.unwrap();
        delete(&gateway, TaskId(7)).await.unwrap();

        let sent: Vec<(Method, String)> = transport
            .sent()
            .into_iter()
            .map(|r| (r.method, r.url.path().to_owned()))
            .collect();
        assert_eq!(
            sent,
            vec![
                (Method::POST, "/api/u1/tasks".to_owned()),
                (Method::PUT, "/api/u1/tasks/7".to_owned()),
                (Method::PATCH, "/api/u1/tasks/7/complete".to_owned()),
                (Method::DELETE, "/api/u1/tasks/7".to_owned()),
            ]
        );

        let update_body: JsonValue =
            serde_json::from_slice(transport.sent()[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(update_body, json!({"title": "Buy oat milk"}));
    }

    #[tokio::test]
    async fn anonymous_call_short_circuits() {
        let (gateway, transport, notifier) = gateway();

        let err = list(&gateway, TaskFilter::All).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthRejected);
        assert_eq!(err.message(), "Authentication required");
        assert!(transport.sent().is_empty());
        assert_eq!(notifier.seen().len(), 1);
    }

    #[tokio::test]
    async fn user_id_is_path_encoded() {
        let (gateway, transport, _) = gateway();
        sign_in(&gateway, "a b/c");
        transport.reply(200, "[]");

        list(&gateway, TaskFilter::All).await.unwrap();

        assert_eq!(transport.sent()[0].url.path(), "/api/a%20b%2Fc/tasks");
    }

    #[tokio::test]
    async fn missing_task_is_validation_error() {
        let (gateway, transport, _) = gateway();
        sign_in(&gateway, "u1");
        transport.reply(404, r#"{"detail":"Task not found"}"#);

        let err = delete(&gateway, TaskId(99)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Task not found");
    }

    #[test]
    fn new_task_omits_missing_description() {
        let body = serde_json::to_value(NewTask::new("x")).unwrap();
        assert_eq!(body, json!({"title": "x"}));
        let body = serde_json::to_value(NewTask::new("x").with_description("y")).unwrap();
        assert_eq!(body, json!({"title": "x", "description": "y"}));
    }
}
