// src/project.rs

use actix_web::{http::header, web, HttpResponse};
use log::{debug, info, warn};

use crate::app_state::AppState;
use crate::config::DeletePolicy;
use crate::error::ApiError;
use crate::models::{Project, ProjectDto, ProjectPayload, Status, Task};
use crate::store::{self, EntityStore, Filter};
use crate::task::remove_task;

async fn project_dto(store: &dyn EntityStore, project: Project) -> ProjectDto {
    let (project_id, status_id) = (project.project_id, project.status_id);
    let mut dto = ProjectDto::from(project);
    if let Some(status_id) = status_id {
        match store::get::<Status>(store, status_id).await {
            Ok(status) => dto.status_name = Some(status.name),
            Err(e) => warn!(
                "Could not load status {} for project {}: {}",
                status_id, project_id, e
            ),
        }
    }
    dto
}

/// GET /api/Project
pub async fn list_projects(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_projects request");
    let projects = store::find::<Project>(data.store(), &Filter::all()).await?;
    let mut dtos = Vec::with_capacity(projects.len());
    for project in projects {
        dtos.push(project_dto(data.store(), project).await);
    }
    Ok(HttpResponse::Ok().json(dtos))
}

/// GET /api/Project/{id}
pub async fn get_project(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let project_id = path.into_inner();
    debug!("Received get_project request for project_id: {}", project_id);
    let project = store::get::<Project>(data.store(), project_id).await?;
    Ok(HttpResponse::Ok().json(project_dto(data.store(), project).await))
}

/// POST /api/Project
pub async fn create_project(
    data: web::Data<AppState>,
    payload: web::Json<ProjectPayload>,
) -> Result<HttpResponse, ApiError> {
    debug!("Received create_project request with payload: {:?}", payload);
    let mut project = payload.into_inner().into_project()?;
    project.project_id = 0;

    let project = store::insert(data.store(), &project).await?;
    info!("Project created {}", project.project_id);

    let location = format!("/api/Project/{}", project.project_id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(project_dto(data.store(), project).await))
}

/// PUT /api/Project/{id}
pub async fn update_project(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<ProjectPayload>,
) -> Result<HttpResponse, ApiError> {
    let project_id = path.into_inner();
    debug!(
        "Received update_project request for project_id: {} with payload: {:?}",
        project_id, payload
    );
    if payload.project_id != project_id {
        return Err(ApiError::validation("Project ID mismatch"));
    }

    let project = payload.into_inner().into_project()?;
    let project = store::update(data.store(), &project).await?;
    info!("Project updated {}", project_id);

    Ok(HttpResponse::Ok().json(project_dto(data.store(), project).await))
}

/// DELETE /api/Project/{id}
/// Cascade deletes the project's tasks (and their comments and
/// dependency rows) first; reject refuses while the project has tasks.
pub async fn delete_project(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let project_id = path.into_inner();
    debug!("Received delete_project request for project_id: {}", project_id);
    let store = data.store();
    store::get::<Project>(store, project_id).await?;

    let tasks = store::find::<Task>(store, &Filter::where_equals("project_id", project_id)).await?;
    match data.config.delete_policy {
        DeletePolicy::Reject if !tasks.is_empty() => {
            return Err(ApiError::Conflict(format!(
                "Project {} still has {} task(s)",
                project_id,
                tasks.len()
            )));
        }
        DeletePolicy::Reject => {}
        DeletePolicy::Cascade => {
            for task in &tasks {
                remove_task(store, task.task_id, DeletePolicy::Cascade).await?;
            }
        }
    }

    store::delete::<Project>(store, project_id).await?;
    info!("Project {} deleted along with {} task(s)", project_id, tasks.len());
    Ok(HttpResponse::NoContent().finish())
}
