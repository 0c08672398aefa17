use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{Record, Table};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub project_id: i64,
    pub status_id: Option<i64>,
}

impl Record for Task {
    const TABLE: Table = Table::Tasks;

    fn id(&self) -> i64 {
        self.task_id
    }
}

/// Task with the names of its project and status and its comment count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub task_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub project_id: i64,
    pub project_name: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    pub comment_count: usize,
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.task_id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            created_at: task.created_at,
            project_id: task.project_id,
            project_name: None,
            status_id: task.status_id,
            status_name: None,
            comment_count: 0,
        }
    }
}

/// Create/update body. Missing ids default to 0, which fails the
/// path/body id check on update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(default)]
    pub task_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: i64,
    pub status_id: Option<i64>,
}

impl TaskPayload {
    /// `created_at` falls back to `default_created` when the body omits it.
    pub fn into_task(self, default_created: DateTime<Utc>) -> Result<Task, ApiError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::validation("Title is required"))?;
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ApiError::validation(format!(
                "Title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(ApiError::validation(format!(
                    "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        if self.project_id < 1 {
            return Err(ApiError::validation("Please select a project"));
        }

        Ok(Task {
            task_id: self.task_id,
            title,
            description: self.description,
            due_date: self.due_date,
            created_at: self.created_at.unwrap_or(default_created),
            project_id: self.project_id,
            status_id: self.status_id,
        })
    }
}
