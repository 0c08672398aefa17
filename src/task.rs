// src/task.rs

use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;
use log::{debug, info, warn};

use crate::app_state::AppState;
use crate::config::DeletePolicy;
use crate::error::ApiError;
use crate::graph::CompletionReport;
use crate::models::{Comment, Project, Status, Task, TaskDependency, TaskDto, TaskPayload};
use crate::retry;
use crate::store::{self, EntityStore, Filter, Record};

/// Builds the wire shape of a task. Project name, status name and comment
/// count are best effort: a failed lookup leaves the field empty.
pub async fn task_dto(store: &dyn EntityStore, task: Task) -> TaskDto {
    let (task_id, project_id, status_id) = (task.task_id, task.project_id, task.status_id);
    let mut dto = TaskDto::from(task);

    match store::get::<Project>(store, project_id).await {
        Ok(project) => dto.project_name = project.name,
        Err(e) => warn!("Could not load project {} for task {}: {}", project_id, task_id, e),
    }
    if let Some(status_id) = status_id {
        match store::get::<Status>(store, status_id).await {
            Ok(status) => dto.status_name = Some(status.name),
            Err(e) => warn!("Could not load status {} for task {}: {}", status_id, task_id, e),
        }
    }
    match store::find::<Comment>(store, &Filter::where_equals("task_id", task_id)).await {
        Ok(comments) => dto.comment_count = comments.len(),
        Err(e) => warn!("Could not count comments for task {}: {}", task_id, e),
    }
    dto
}

async fn task_dtos(store: &dyn EntityStore, tasks: Vec<Task>) -> Vec<TaskDto> {
    let mut dtos = Vec::with_capacity(tasks.len());
    for task in tasks {
        dtos.push(task_dto(store, task).await);
    }
    dtos
}

/// Deletes a task under the given policy.
///
/// Cascade removes the task's comments and every dependency row naming it
/// before the task itself. Reject refuses while any of those exist. The
/// deletes are issued one after another, not as a transaction.
pub async fn remove_task(
    store: &dyn EntityStore,
    task_id: i64,
    policy: DeletePolicy,
) -> Result<(), ApiError> {
    store::get::<Task>(store, task_id).await?;

    let comments = Filter::where_equals("task_id", task_id);
    let as_prerequisite = Filter::where_equals("task_id", task_id);
    let as_dependent = Filter::where_equals("dependent_task_id", task_id);

    match policy {
        DeletePolicy::Reject => {
            let comment_count = store::find::<Comment>(store, &comments).await?.len();
            let dependency_count = store::find::<TaskDependency>(store, &as_prerequisite)
                .await?
                .len()
                + store::find::<TaskDependency>(store, &as_dependent).await?.len();
            if comment_count + dependency_count > 0 {
                return Err(ApiError::Conflict(format!(
                    "Task {} still has {} comment(s) and {} dependency row(s)",
                    task_id, comment_count, dependency_count
                )));
            }
        }
        DeletePolicy::Cascade => {
            let removed_comments = store.delete_where(Comment::TABLE, &comments).await?;
            let removed_edges = store
                .delete_where(TaskDependency::TABLE, &as_prerequisite)
                .await?
                + store.delete_where(TaskDependency::TABLE, &as_dependent).await?;
            if removed_comments + removed_edges > 0 {
                info!(
                    "Task {}: removed {} comment(s) and {} dependency row(s)",
                    task_id, removed_comments, removed_edges
                );
            }
        }
    }

    store::delete::<Task>(store, task_id).await?;
    info!("Task {} deleted", task_id);
    Ok(())
}

/// GET /api/Task
pub async fn list_tasks(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_tasks request");
    let tasks = store::find::<Task>(data.store(), &Filter::all()).await?;
    Ok(HttpResponse::Ok().json(task_dtos(data.store(), tasks).await))
}

/// GET /api/Task/{id}
/// Retries on not-found per the configured task fetch policy.
pub async fn get_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received get_task request for task_id: {}", task_id);
    let task = retry::get_with_retry::<Task>(data.store(), task_id, &data.config.task_fetch).await?;
    Ok(HttpResponse::Ok().json(task_dto(data.store(), task).await))
}

/// GET /api/Task/Project/{project_id}
pub async fn list_tasks_by_project(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let project_id = path.into_inner();
    debug!("Received list_tasks_by_project request for project_id: {}", project_id);
    let tasks =
        store::find::<Task>(data.store(), &Filter::where_equals("project_id", project_id)).await?;
    Ok(HttpResponse::Ok().json(task_dtos(data.store(), tasks).await))
}

/// POST /api/Task
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<TaskPayload>,
) -> Result<HttpResponse, ApiError> {
    debug!("Received create_task request with payload: {:?}", payload);
    let mut task = payload.into_inner().into_task(Utc::now())?;
    task.task_id = 0;

    let task = store::insert(data.store(), &task).await?;
    info!("Task created {} in project {}", task.task_id, task.project_id);

    let location = format!("/api/Task/{}", task.task_id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(task_dto(data.store(), task).await))
}

/// PUT /api/Task/{id}
/// Full replacement; `createdAt` is kept when the body omits it.
pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<TaskPayload>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received update_task request for task_id: {} with payload: {:?}", task_id, payload);
    if payload.task_id != task_id {
        return Err(ApiError::validation("Task ID mismatch"));
    }

    let existing = store::get::<Task>(data.store(), task_id).await?;
    let task = payload.into_inner().into_task(existing.created_at)?;
    let task = store::update(data.store(), &task).await?;
    info!("Task updated {}", task_id);

    Ok(HttpResponse::Ok().json(task_dto(data.store(), task).await))
}

/// DELETE /api/Task/{id}
pub async fn delete_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received delete_task request for task_id: {}", task_id);
    remove_task(data.store(), task_id, data.config.delete_policy).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/Task/{id}/CanComplete
pub async fn can_complete(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received can_complete request for task_id: {}", task_id);
    store::get::<Task>(data.store(), task_id).await?;

    let eligibility = data.graph().can_complete(task_id).await;
    Ok(HttpResponse::Ok().json(CompletionReport::new(task_id, eligibility)))
}

/// GET /api/Task/Blocked
pub async fn list_blocked_tasks(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_blocked_tasks request");
    let blocked = data.graph().list_blocked_tasks().await.map_err(|e| {
        ApiError::Internal(format!("Error scanning for blocked tasks: {}", e))
    })?;
    Ok(HttpResponse::Ok().json(blocked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::test_support::*;

    #[tokio::test]
    async fn dto_carries_names_and_comment_count() {
        let store = MemoryStore::new();
        let project = seed_project(&store, "Website").await;
        let status = seed_status(&store, "In Progress").await;
        let task_id = seed_task(&store, "Landing page", Some(status)).await;
        seed_comment(&store, task_id, "first").await;
        seed_comment(&store, task_id, "second").await;

        let task: Task = store::get(&store, task_id).await.unwrap();
        assert_eq!(task.project_id, project);
        let dto = task_dto(&store, task).await;
        assert_eq!(dto.project_name.as_deref(), Some("Website"));
        assert_eq!(dto.status_name.as_deref(), Some("In Progress"));
        assert_eq!(dto.comment_count, 2);
    }

    #[tokio::test]
    async fn dto_survives_missing_references() {
        let store = MemoryStore::new();
        let task_id = seed_task(&store, "Orphan", Some(42)).await;
        let task: Task = store::get(&store, task_id).await.unwrap();
        let dto = task_dto(&store, task).await;
        assert_eq!(dto.title, "Orphan");
        assert!(dto.project_name.is_none());
        assert!(dto.status_name.is_none());
        assert_eq!(dto.comment_count, 0);
    }

    #[tokio::test]
    async fn cascade_removes_comments_and_edges() {
        let store = MemoryStore::new();
        let a = seed_task(&store, "A", None).await;
        let b = seed_task(&store, "B", None).await;
        let c = seed_task(&store, "C", None).await;
        seed_dependency(&store, a, b).await;
        seed_dependency(&store, b, c).await;
        seed_comment(&store, b, "note").await;

        remove_task(&store, b, DeletePolicy::Cascade).await.unwrap();

        assert!(store::get::<Task>(&store, b).await.unwrap_err().is_not_found());
        let edges = store::find::<TaskDependency>(&store, &Filter::all()).await.unwrap();
        assert!(edges.is_empty());
        let comments = store::find::<Comment>(&store, &Filter::all()).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn reject_keeps_referenced_tasks() {
        let store = MemoryStore::new();
        let a = seed_task(&store, "A", None).await;
        let b = seed_task(&store, "B", None).await;
        seed_dependency(&store, a, b).await;

        let err = remove_task(&store, b, DeletePolicy::Reject).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(store::get::<Task>(&store, b).await.is_ok());

        let free = seed_task(&store, "Free", None).await;
        remove_task(&store, free, DeletePolicy::Reject).await.unwrap();
    }

    #[tokio::test]
    async fn removing_a_missing_task_is_not_found() {
        let store = MemoryStore::new();
        let err = remove_task(&store, 9, DeletePolicy::Cascade).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
