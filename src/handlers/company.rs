use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::database::repositories::company::{self as company_repo, CompanyInput, LocationProfileInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

pub async fn create_company(input: web::Json<CompanyInput>) -> Result<HttpResponse, AppError> {
    let company = company_repo::create(&input.into_inner()).await?;
    Ok(ApiResponse::created(company))
}

pub async fn get_company(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let company = company_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
    Ok(ApiResponse::success(company))
}

pub async fn create_location(
    input: web::Json<LocationProfileInput>,
) -> Result<HttpResponse, AppError> {
    let location = company_repo::create_location(&input.into_inner()).await?;
    Ok(ApiResponse::created(location))
}
