use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    AssignmentAction, AssignmentState, Availability, LaborRequest, LaborRequirement,
};
use crate::database::repositories::{
    request as request_repo, requirement as requirement_repo, worker as worker_repo,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{assignment, fcfs, notifier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueWorkerRequest {
    pub worker_id: Uuid,
    #[serde(default)]
    pub is_reserved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub response: Availability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(flatten)]
    pub request: LaborRequest,
    pub state: AssignmentState,
}

impl From<LaborRequest> for RosterEntry {
    fn from(request: LaborRequest) -> Self {
        let state = request.state();
        RosterEntry { request, state }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub requirement: LaborRequirement,
    pub pending: Vec<RosterEntry>,
    pub available: Vec<RosterEntry>,
    pub confirmed: Vec<RosterEntry>,
    pub declined: Vec<RosterEntry>,
    pub cancelled: Vec<RosterEntry>,
    pub no_call_no_show: Vec<RosterEntry>,
    pub confirmed_count: i32,
    pub fcfs_confirmed_count: i32,
    pub is_filled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub request: Option<RosterEntry>,
    pub promoted: Vec<RosterEntry>,
    pub deleted: bool,
}

impl From<assignment::TransitionOutcome> for ActionResponse {
    fn from(outcome: assignment::TransitionOutcome) -> Self {
        ActionResponse {
            request: if outcome.deleted {
                None
            } else {
                Some(outcome.entry.into())
            },
            promoted: outcome.promoted.into_iter().map(Into::into).collect(),
            deleted: outcome.deleted,
        }
    }
}

pub async fn queue_worker(
    path: web::Path<Uuid>,
    input: web::Json<QueueWorkerRequest>,
) -> Result<HttpResponse, AppError> {
    let requirement_id = path.into_inner();

    requirement_repo::find_by_id(requirement_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;
    worker_repo::find_by_id(input.worker_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Worker not found".to_string()))?;

    let request = request_repo::queue_worker(requirement_id, input.worker_id, input.is_reserved)
        .await?;

    log::info!(
        "Queued worker {} on requirement {} (reserved: {})",
        input.worker_id,
        requirement_id,
        input.is_reserved
    );

    Ok(ApiResponse::created(RosterEntry::from(request)))
}

pub async fn get_roster(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let requirement_id = path.into_inner();
    let requirement = requirement_repo::find_by_id(requirement_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;
    let roster = request_repo::roster(requirement_id).await?;

    let confirmed_count = fcfs::confirmed_count(&roster) as i32;
    let fcfs_confirmed_count = fcfs::fcfs_confirmed_count(&roster) as i32;

    let mut response = RosterResponse {
        is_filled: confirmed_count >= requirement.needed_positions,
        requirement,
        pending: Vec::new(),
        available: Vec::new(),
        confirmed: Vec::new(),
        declined: Vec::new(),
        cancelled: Vec::new(),
        no_call_no_show: Vec::new(),
        confirmed_count,
        fcfs_confirmed_count,
    };

    for request in roster {
        let entry = RosterEntry::from(request);
        match entry.state {
            AssignmentState::Pending => response.pending.push(entry),
            AssignmentState::Available => response.available.push(entry),
            AssignmentState::Confirmed => response.confirmed.push(entry),
            AssignmentState::Declined => response.declined.push(entry),
            AssignmentState::Cancelled => response.cancelled.push(entry),
            AssignmentState::NoCallNoShow => response.no_call_no_show.push(entry),
        }
    }

    Ok(ApiResponse::success(response))
}

/// Send availability requests to everyone queued on this requirement's call
/// time who has not been notified yet. Per-worker failures come back in the
/// summary; the batch never aborts part way.
pub async fn dispatch_notifications(
    path: web::Path<Uuid>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let requirement = requirement_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;

    let summary = notifier::dispatch_queued(requirement.call_time_id, &config).await?;

    log::info!(
        "Dispatched {}/{} availability requests for call time {}",
        summary.sent,
        summary.queued,
        requirement.call_time_id
    );

    Ok(ApiResponse::success(summary))
}

pub async fn get_request(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let request = request_repo::find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Labor request not found".to_string()))?;

    Ok(ApiResponse::success(RosterEntry::from(request)))
}

pub async fn request_action(
    path: web::Path<Uuid>,
    input: web::Json<AssignmentAction>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let action = input.into_inner();

    let outcome = assignment::apply_action(request_id, action).await?;

    if !outcome.promoted.is_empty() {
        log::info!(
            "Action on request {} promoted {} waiting worker(s)",
            request_id,
            outcome.promoted.len()
        );
    }

    Ok(ApiResponse::success(ActionResponse::from(outcome)))
}

pub async fn respond_by_token(
    path: web::Path<String>,
    input: web::Json<RespondRequest>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();
    let outcome = assignment::respond_by_token(&token, input.response).await?;

    let message = match outcome.entry.state() {
        AssignmentState::Confirmed => "You are confirmed for this call",
        AssignmentState::Available => "Thanks! You are on the list if a spot opens up",
        _ => "Response recorded",
    };

    Ok(ApiResponse::success_with_message(
        Some(ActionResponse::from(outcome)),
        message,
    ))
}
