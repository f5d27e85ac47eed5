use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::LaborRequirementInput;
use crate::database::repositories::requirement as requirement_repo;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFcfsRequest {
    pub fcfs_positions: i32,
}

pub async fn create_requirement(
    input: web::Json<LaborRequirementInput>,
) -> Result<HttpResponse, AppError> {
    let requirement = requirement_repo::create(&input.into_inner()).await?;

    log::info!(
        "Created requirement {} ({} x{}, fcfs {})",
        requirement.id,
        requirement.labor_type,
        requirement.needed_positions,
        requirement.fcfs_positions
    );

    Ok(ApiResponse::created(requirement))
}

pub async fn get_requirement(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let requirement = requirement_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;

    Ok(ApiResponse::success(requirement))
}

pub async fn update_requirement(
    path: web::Path<Uuid>,
    input: web::Json<LaborRequirementInput>,
) -> Result<HttpResponse, AppError> {
    let requirement = requirement_repo::update(path.into_inner(), &input.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;

    Ok(ApiResponse::success(requirement))
}

pub async fn set_fcfs(
    path: web::Path<Uuid>,
    input: web::Json<SetFcfsRequest>,
) -> Result<HttpResponse, AppError> {
    let requirement = requirement_repo::set_fcfs(path.into_inner(), input.fcfs_positions)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;

    Ok(ApiResponse::success(requirement))
}

pub async fn delete_requirement(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !requirement_repo::delete(id).await? {
        return Err(AppError::NotFound("Labor requirement not found".to_string()));
    }

    log::info!("Deleted requirement {} and its requests", id);

    Ok(ApiResponse::<()>::success_with_message(
        None,
        "Labor requirement deleted",
    ))
}
