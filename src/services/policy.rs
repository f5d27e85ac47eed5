use serde::Serialize;
use uuid::Uuid;

use crate::database::repositories::policy as policy_repo;
use crate::error::AppError;

/// Fully resolved pay policy for one labor requirement. Every field has a
/// value by the time a caller sees it; the layering (requirement, call time,
/// location, company) is settled in SQL.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContext {
    pub minimum_hours: f64,
    pub meal_penalty_trigger_hours: f64,
    pub round_up_target: i32,
    pub hour_round_up: i32,
}

pub async fn for_requirement(requirement_id: Uuid) -> Result<PolicyContext, AppError> {
    policy_repo::resolve_for_requirement(requirement_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))
}

pub async fn for_labor_request(labor_request_id: Uuid) -> Result<PolicyContext, AppError> {
    policy_repo::resolve_for_labor_request(labor_request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor request not found".to_string()))
}
