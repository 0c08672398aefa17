use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{Record, Table};

/// Edge of the dependency graph: `dependent_task_id` cannot complete
/// until `task_id` (the prerequisite) has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub dependency_id: i64,
    pub task_id: i64,
    pub dependent_task_id: i64,
}

impl Record for TaskDependency {
    const TABLE: Table = Table::TaskDependencies;

    fn id(&self) -> i64 {
        self.dependency_id
    }
}

/// Dependency row plus display fields. The `task_status_*` fields describe
/// the prerequisite. Enrichment fields stay `None` when their lookup fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependencyDto {
    pub dependency_id: i64,
    pub task_id: i64,
    pub dependent_task_id: i64,
    pub task_title: Option<String>,
    pub dependent_task_title: Option<String>,
    pub task_status_id: Option<i64>,
    pub task_status_name: Option<String>,
}

impl From<&TaskDependency> for TaskDependencyDto {
    fn from(dep: &TaskDependency) -> Self {
        Self {
            dependency_id: dep.dependency_id,
            task_id: dep.task_id,
            dependent_task_id: dep.dependent_task_id,
            task_title: None,
            dependent_task_title: None,
            task_status_id: None,
            task_status_name: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependencyPayload {
    #[serde(default)]
    pub dependency_id: i64,
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub dependent_task_id: i64,
}

impl TaskDependencyPayload {
    pub fn into_dependency(self) -> Result<TaskDependency, ApiError> {
        if self.task_id < 1 {
            return Err(ApiError::validation("Task ID is required"));
        }
        if self.dependent_task_id < 1 {
            return Err(ApiError::validation("Dependent Task ID is required"));
        }
        Ok(TaskDependency {
            dependency_id: self.dependency_id,
            task_id: self.task_id,
            dependent_task_id: self.dependent_task_id,
        })
    }
}
