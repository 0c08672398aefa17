// src/status.rs

use actix_web::{http::header, web, HttpResponse};
use log::{debug, info};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{Status, StatusDto, StatusPayload};
use crate::store::{self, Filter};

/// GET /api/Status
pub async fn list_statuses(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    debug!("Received list_statuses request");
    let statuses = store::find::<Status>(data.store(), &Filter::all()).await?;
    let dtos: Vec<StatusDto> = statuses.into_iter().map(StatusDto::from).collect();
    Ok(HttpResponse::Ok().json(dtos))
}

/// GET /api/Status/{id}
pub async fn get_status(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let status_id = path.into_inner();
    debug!("Received get_status request for status_id: {}", status_id);
    let status = store::get::<Status>(data.store(), status_id).await?;
    Ok(HttpResponse::Ok().json(StatusDto::from(status)))
}

/// POST /api/Status
/// The name is stored in its canonical form ("in progress" becomes "In Progress").
pub async fn create_status(
    data: web::Data<AppState>,
    payload: web::Json<StatusPayload>,
) -> Result<HttpResponse, ApiError> {
    debug!("Received create_status request with payload: {:?}", payload);
    let mut status = payload.into_inner().into_status()?;
    status.status_id = 0;

    let status = store::insert(data.store(), &status).await?;
    info!("Status created {} ({})", status.status_id, status.name);

    let location = format!("/api/Status/{}", status.status_id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(StatusDto::from(status)))
}

/// PUT /api/Status/{id}
pub async fn update_status(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<StatusPayload>,
) -> Result<HttpResponse, ApiError> {
    let status_id = path.into_inner();
    debug!(
        "Received update_status request for status_id: {} with payload: {:?}",
        status_id, payload
    );
    if payload.status_id != status_id {
        return Err(ApiError::validation("Status ID mismatch"));
    }

    let status = payload.into_inner().into_status()?;
    let status = store::update(data.store(), &status).await?;
    info!("Status updated {}", status_id);
    Ok(HttpResponse::Ok().json(StatusDto::from(status)))
}

/// DELETE /api/Status/{id}
/// Tasks keep their `statusId`; eligibility reports a dangling status as unknown.
pub async fn delete_status(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let status_id = path.into_inner();
    debug!("Received delete_status request for status_id: {}", status_id);
    store::delete::<Status>(data.store(), status_id).await?;
    info!("Status {} deleted", status_id);
    Ok(HttpResponse::NoContent().finish())
}
