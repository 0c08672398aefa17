use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{Record, Table};

pub const MAX_CONTENT_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: i64,
    pub task_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Comment {
    const TABLE: Table = Table::Comments;

    fn id(&self) -> i64 {
        self.comment_id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub comment_id: i64,
    pub task_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.comment_id,
            task_id: comment.task_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    #[serde(default)]
    pub comment_id: i64,
    #[serde(default)]
    pub task_id: i64,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CommentPayload {
    pub fn into_comment(self, default_created: DateTime<Utc>) -> Result<Comment, ApiError> {
        if self.task_id < 1 {
            return Err(ApiError::validation("Task is required"));
        }
        let content = self
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::validation("Content is required"))?;
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(ApiError::validation(format!(
                "Content cannot exceed {MAX_CONTENT_LEN} characters"
            )));
        }
        Ok(Comment {
            comment_id: self.comment_id,
            task_id: self.task_id,
            content,
            created_at: self.created_at.unwrap_or(default_created),
        })
    }
}
