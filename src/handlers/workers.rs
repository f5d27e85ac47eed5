use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::WorkerInput;
use crate::database::repositories::worker as worker_repo;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerQuery {
    pub company_id: Uuid,
}

pub async fn create_worker(input: web::Json<WorkerInput>) -> Result<HttpResponse, AppError> {
    let worker = worker_repo::create(&input.into_inner()).await?;
    Ok(ApiResponse::created(worker))
}

pub async fn get_worker(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let worker = worker_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Worker not found".to_string()))?;
    Ok(ApiResponse::success(worker))
}

pub async fn list_workers(query: web::Query<WorkerQuery>) -> Result<HttpResponse, AppError> {
    let workers = worker_repo::find_by_company(query.company_id).await?;
    Ok(ApiResponse::success(workers))
}
