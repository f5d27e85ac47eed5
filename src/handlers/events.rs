use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{CallTime, LaborRequirement};
use crate::database::repositories::event::{self as event_repo, CallTimeInput, EventInput};
use crate::database::repositories::requirement as requirement_repo;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTimeResponse {
    #[serde(flatten)]
    pub call_time: CallTime,
    pub requirements: Vec<LaborRequirement>,
}

pub async fn create_event(input: web::Json<EventInput>) -> Result<HttpResponse, AppError> {
    let event = event_repo::create(&input.into_inner()).await?;
    Ok(ApiResponse::created(event))
}

pub async fn get_event(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let event = event_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(ApiResponse::success(event))
}

pub async fn create_call_time(input: web::Json<CallTimeInput>) -> Result<HttpResponse, AppError> {
    let call_time = event_repo::create_call_time(&input.into_inner()).await?;
    Ok(ApiResponse::created(call_time))
}

pub async fn get_call_time(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let call_time = event_repo::find_call_time(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Call time not found".to_string()))?;
    let requirements = requirement_repo::find_by_call_time(id).await?;

    Ok(ApiResponse::success(CallTimeResponse {
        call_time,
        requirements,
    }))
}
