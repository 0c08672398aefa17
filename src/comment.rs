// src/comment.rs

use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;
use log::{debug, info};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{Comment, CommentDto, CommentPayload, Task};
use crate::store::{self, EntityStore, Filter};

async fn ensure_task_exists(store: &dyn EntityStore, task_id: i64) -> Result<(), ApiError> {
    match store::get::<Task>(store, task_id).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => Err(ApiError::validation(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/Comment
pub async fn list_comments(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_comments request");
    let comments = store::find::<Comment>(data.store(), &Filter::all()).await?;
    let dtos: Vec<CommentDto> = comments.into_iter().map(CommentDto::from).collect();
    Ok(HttpResponse::Ok().json(dtos))
}

/// GET /api/Comment/{id}
pub async fn get_comment(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = path.into_inner();
    debug!("Received get_comment request for comment_id: {}", comment_id);
    let comment = store::get::<Comment>(data.store(), comment_id).await?;
    Ok(HttpResponse::Ok().json(CommentDto::from(comment)))
}

/// GET /api/Comment/task/{task_id}
/// Oldest first.
pub async fn list_comments_by_task(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    debug!("Received list_comments_by_task request for task_id: {}", task_id);
    let mut comments =
        store::find::<Comment>(data.store(), &Filter::where_equals("task_id", task_id)).await?;
    comments.sort_by_key(|c| c.created_at);
    let dtos: Vec<CommentDto> = comments.into_iter().map(CommentDto::from).collect();
    Ok(HttpResponse::Ok().json(dtos))
}

/// POST /api/Comment
pub async fn create_comment(
    data: web::Data<AppState>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, ApiError> {
    debug!("Received create_comment request with payload: {:?}", payload);
    let mut comment = payload.into_inner().into_comment(Utc::now())?;
    comment.comment_id = 0;
    ensure_task_exists(data.store(), comment.task_id).await?;

    let comment = store::insert(data.store(), &comment).await?;
    info!("Comment created {} on task {}", comment.comment_id, comment.task_id);

    let location = format!("/api/Comment/{}", comment.comment_id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(CommentDto::from(comment)))
}

/// PUT /api/Comment/{id}
pub async fn update_comment(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = path.into_inner();
    debug!(
        "Received update_comment request for comment_id: {} with payload: {:?}",
        comment_id, payload
    );
    if payload.comment_id != comment_id {
        return Err(ApiError::validation("Comment ID mismatch"));
    }

    let existing = store::get::<Comment>(data.store(), comment_id).await?;
    let comment = payload.into_inner().into_comment(existing.created_at)?;
    if comment.task_id != existing.task_id {
        ensure_task_exists(data.store(), comment.task_id).await?;
    }
    let comment = store::update(data.store(), &comment).await?;
    info!("Comment updated {}", comment_id);
    Ok(HttpResponse::Ok().json(CommentDto::from(comment)))
}

/// DELETE /api/Comment/{id}
pub async fn delete_comment(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = path.into_inner();
    debug!("Received delete_comment request for comment_id: {}", comment_id);
    store::delete::<Comment>(data.store(), comment_id).await?;
    info!("Comment {} deleted", comment_id);
    Ok(HttpResponse::NoContent().finish())
}
