use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{Record, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status_id: Option<i64>,
}

impl Record for Project {
    const TABLE: Table = Table::Projects;

    fn id(&self) -> i64 {
        self.project_id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub project_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
}

impl From<Project> for ProjectDto {
    fn from(project: Project) -> Self {
        Self {
            project_id: project.project_id,
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
            status_id: project.status_id,
            status_name: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    #[serde(default)]
    pub project_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status_id: Option<i64>,
}

impl ProjectPayload {
    pub fn into_project(self) -> Result<Project, ApiError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ApiError::validation(
                    "Project start date must not be after its end date",
                ));
            }
        }
        Ok(Project {
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            status_id: self.status_id,
        })
    }
}
