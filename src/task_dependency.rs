// src/task_dependency.rs

use actix_web::{http::header, web, HttpResponse};
use log::{debug, info};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{TaskDependency, TaskDependencyPayload};
use crate::store;

/// GET /api/TaskDependency
pub async fn list_dependencies(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_dependencies request");
    let rows = data.graph().all_dependencies().await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/TaskDependency/{id}
pub async fn get_dependency(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let dependency_id = path.into_inner();
    debug!("Received get_dependency request for dependency_id: {}", dependency_id);
    let row = data.graph().dependency(dependency_id).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// GET /api/TaskDependency/ForTask/{task_id}
/// Rows naming `task_id` as the dependent, i.e. its prerequisites.
pub async fn list_dependencies_for_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received list_dependencies_for_task request for task_id: {}", task_id);
    let rows = data.graph().dependencies_for(task_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/TaskDependency/DependentOn/{task_id}
/// Rows naming `task_id` as the prerequisite, i.e. the tasks it blocks.
pub async fn list_dependents_for_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received list_dependents_for_task request for task_id: {}", task_id);
    let rows = data.graph().dependents_for(task_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// POST /api/TaskDependency
/// 400 when the edge is a self-reference, names a missing task or closes a cycle.
pub async fn create_dependency(
    data: web::Data<AppState>,
    payload: web::Json<TaskDependencyPayload>,
) -> Result<HttpResponse, ApiError> {
    debug!("Received create_dependency request with payload: {:?}", payload);
    let mut dependency = payload.into_inner().into_dependency()?;
    dependency.dependency_id = 0;

    let graph = data.graph();
    graph
        .validate_edge(dependency.task_id, dependency.dependent_task_id, None)
        .await?;
    let dependency = store::insert(data.store(), &dependency).await?;
    info!(
        "Dependency created {}: task {} blocks task {}",
        dependency.dependency_id, dependency.task_id, dependency.dependent_task_id
    );

    let row = graph.dependency(dependency.dependency_id).await?;
    let location = format!("/api/TaskDependency/{}", dependency.dependency_id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(row))
}

/// PUT /api/TaskDependency/{id}
pub async fn update_dependency(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<TaskDependencyPayload>,
) -> Result<HttpResponse, ApiError> {
    let dependency_id = path.into_inner();
    debug!(
        "Received update_dependency request for dependency_id: {} with payload: {:?}",
        dependency_id, payload
    );
    if payload.dependency_id != dependency_id {
        return Err(ApiError::validation("Dependency ID mismatch"));
    }

    let dependency = payload.into_inner().into_dependency()?;
    store::get::<TaskDependency>(data.store(), dependency_id).await?;

    let graph = data.graph();
    graph
        .validate_edge(
            dependency.task_id,
            dependency.dependent_task_id,
            Some(dependency_id),
        )
        .await?;
    store::update(data.store(), &dependency).await?;
    info!("Dependency updated {}", dependency_id);

    Ok(HttpResponse::Ok().json(graph.dependency(dependency_id).await?))
}

/// DELETE /api/TaskDependency/{id}
pub async fn delete_dependency(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let dependency_id = path.into_inner();
    debug!("Received delete_dependency request for dependency_id: {}", dependency_id);
    store::delete::<TaskDependency>(data.store(), dependency_id).await?;
    info!("Dependency {} deleted", dependency_id);
    Ok(HttpResponse::NoContent().finish())
}
