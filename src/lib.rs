//! Task tracker REST API: projects, statuses, tasks, comments and the
//! dependency graph between tasks.

pub mod app_state;
pub mod comment;
pub mod config;
pub mod error;
pub mod graph;
pub mod middleware;
pub mod models;
pub mod project;
pub mod retry;
pub mod status;
pub mod store;
pub mod task;
pub mod task_dependency;

#[cfg(test)]
mod test_support;

use actix_web::{error::InternalError, web, HttpResponse, ResponseError};

use crate::app_state::AppState;
use crate::error::ApiError;

/// GET /health
pub async fn health(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    data.store().ping().await?;
    Ok(HttpResponse::Ok().body("ok"))
}

/// Registers every route under `/api` plus `/health`. Expects `AppState`
/// to be registered as app data by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let msg = format!("Malformed request body: {}", err);
        InternalError::from_response(err, ApiError::validation(msg).error_response()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        let msg = format!("Malformed path: {}", err);
        InternalError::from_response(err, ApiError::validation(msg).error_response()).into()
    }))
    .route("/health", web::get().to(health))
    .service(
        web::scope("/api")
            .service(
                web::scope("/Project")
                    .route("", web::get().to(project::list_projects))
                    .route("", web::post().to(project::create_project))
                    .route("/{id}", web::get().to(project::get_project))
                    .route("/{id}", web::put().to(project::update_project))
                    .route("/{id}", web::delete().to(project::delete_project)),
            )
            .service(
                web::scope("/Status")
                    .route("", web::get().to(status::list_statuses))
                    .route("", web::post().to(status::create_status))
                    .route("/{id}", web::get().to(status::get_status))
                    .route("/{id}", web::put().to(status::update_status))
                    .route("/{id}", web::delete().to(status::delete_status)),
            )
            .service(
                web::scope("/Task")
                    .route("", web::get().to(task::list_tasks))
                    .route("", web::post().to(task::create_task))
                    // Literal segments before "/{id}" so they are not parsed as ids.
                    .route("/Blocked", web::get().to(task::list_blocked_tasks))
                    .route("/Project/{project_id}", web::get().to(task::list_tasks_by_project))
                    .route("/{id}", web::get().to(task::get_task))
                    .route("/{id}", web::put().to(task::update_task))
                    .route("/{id}", web::delete().to(task::delete_task))
                    .route("/{id}/CanComplete", web::get().to(task::can_complete)),
            )
            .service(
                web::scope("/Comment")
                    .route("", web::get().to(comment::list_comments))
                    .route("", web::post().to(comment::create_comment))
                    .route("/task/{task_id}", web::get().to(comment::list_comments_by_task))
                    .route("/{id}", web::get().to(comment::get_comment))
                    .route("/{id}", web::put().to(comment::update_comment))
                    .route("/{id}", web::delete().to(comment::delete_comment)),
            )
            .service(
                web::scope("/TaskDependency")
                    .route("", web::get().to(task_dependency::list_dependencies))
                    .route("", web::post().to(task_dependency::create_dependency))
                    .route(
                        "/ForTask/{task_id}",
                        web::get().to(task_dependency::list_dependencies_for_task),
                    )
                    .route(
                        "/DependentOn/{task_id}",
                        web::get().to(task_dependency::list_dependents_for_task),
                    )
                    .route("/{id}", web::get().to(task_dependency::get_dependency))
                    .route("/{id}", web::put().to(task_dependency::update_dependency))
                    .route("/{id}", web::delete().to(task_dependency::delete_dependency)),
            ),
    );
}
