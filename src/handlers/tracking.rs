use actix_web::{web, HttpResponse};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{BreakType, CallTime, MealBreak, TimeEntry};
use crate::database::repositories::{
    event as event_repo, request as request_repo, time_entry as time_entry_repo,
};
use crate::database::DatabaseTransaction;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::hours::{self, TimeSheet};
use crate::services::policy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTimeRequest {
    pub time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealBreakRequest {
    /// Defaults to "now" when the worker reports the break as it happens.
    pub break_time: Option<DateTime<Utc>>,
    pub break_type: BreakType,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealBreakRequest {
    pub break_time: DateTime<Utc>,
    pub break_type: BreakType,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryResponse {
    #[serde(flatten)]
    pub entry: TimeEntry,
    pub breaks: Vec<MealBreak>,
}

async fn confirmed_request(request_id: Uuid) -> Result<(), AppError> {
    let request = request_repo::find_by_id(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Labor request not found".to_string()))?;
    if !request.confirmed {
        return Err(AppError::InvalidTransition(
            "Only confirmed requests can be tracked".to_string(),
        ));
    }
    Ok(())
}

async fn entry_for_request(request_id: Uuid) -> Result<TimeEntry, AppError> {
    time_entry_repo::find_by_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No time entry for this request".to_string()))
}

/// The timestamp a clock-in records: the scheduled call time, passed through
/// the same rounding as any manually entered time.
fn scheduled_clock_in(call_time: &CallTime, round_up_target: i32) -> DateTime<Utc> {
    hours::round_time(
        Utc.from_utc_datetime(&call_time.scheduled_start()),
        round_up_target,
    )
}

fn validate_start_edit(start: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> Result<(), AppError> {
    if let Some(end) = end_time {
        if start >= end {
            return Err(AppError::InvalidTimeFormat(
                "Start time must come before the end time".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_end_edit(end: DateTime<Utc>, start_time: Option<DateTime<Utc>>) -> Result<(), AppError> {
    let start = start_time.ok_or_else(|| {
        AppError::InvalidTimeFormat("Set a start time first".to_string())
    })?;
    if end <= start {
        return Err(AppError::InvalidTimeFormat(
            "End time must come after the start time".to_string(),
        ));
    }
    Ok(())
}

/// Clock-in stamps the scheduled call time, not the moment the button was
/// pressed; being early or late to sign in never moves payable time.
pub async fn clock_in(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    confirmed_request(request_id).await?;

    let context = policy::for_labor_request(request_id).await?;
    let call_time = event_repo::call_time_for_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Call time not found".to_string()))?;
    let scheduled = scheduled_clock_in(&call_time, context.round_up_target);

    let entry = DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = time_entry_repo::get_or_create_tx(tx, request_id).await?;
            if entry.start_time.is_some() {
                return Err(AppError::InvalidTransition(
                    "Already clocked in".to_string(),
                ));
            }
            Ok(time_entry_repo::set_start_tx(tx, entry.id, scheduled).await?)
        })
    })
    .await?;

    log::info!("Clocked in request {} at scheduled {}", request_id, scheduled);

    Ok(ApiResponse::created(entry))
}

/// Clock-out captures "now", shaped by the rounding policy and floored to the
/// guaranteed minimum hours.
pub async fn clock_out(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;

    let entry = DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = time_entry_repo::get_or_create_tx(tx, request_id).await?;
            let start = entry.start_time.ok_or_else(|| {
                AppError::InvalidTransition("Not clocked in".to_string())
            })?;

            let shaped = hours::shape_clock_out(Utc::now(), context.hour_round_up);
            let end = hours::apply_minimum_hours(start, shaped, context.minimum_hours);
            Ok(time_entry_repo::set_end_tx(tx, entry.id, end).await?)
        })
    })
    .await?;

    Ok(ApiResponse::success(entry))
}

pub async fn update_start_time(
    path: web::Path<Uuid>,
    input: web::Json<EditTimeRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;
    let rounded = hours::round_time(input.time, context.round_up_target);

    let entry = DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = time_entry_repo::get_or_create_tx(tx, request_id).await?;
            validate_start_edit(rounded, entry.end_time)?;
            Ok(time_entry_repo::set_start_tx(tx, entry.id, rounded).await?)
        })
    })
    .await?;

    Ok(ApiResponse::success(entry))
}

pub async fn update_end_time(
    path: web::Path<Uuid>,
    input: web::Json<EditTimeRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;
    let rounded = hours::round_time(input.time, context.round_up_target);

    let entry = DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = time_entry_repo::get_or_create_tx(tx, request_id).await?;
            validate_end_edit(rounded, entry.start_time)?;
            Ok(time_entry_repo::set_end_tx(tx, entry.id, rounded).await?)
        })
    })
    .await?;

    Ok(ApiResponse::success(entry))
}

fn check_break_bounds(entry: &TimeEntry, break_time: DateTime<Utc>) -> Result<(), AppError> {
    if let Some(start) = entry.start_time {
        if break_time < start {
            return Err(AppError::InvalidTimeFormat(
                "Break must fall within the shift".to_string(),
            ));
        }
    }
    if let Some(end) = entry.end_time {
        if break_time > end {
            return Err(AppError::InvalidTimeFormat(
                "Break must fall within the shift".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn add_meal_break(
    path: web::Path<Uuid>,
    input: web::Json<MealBreakRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;
    let entry = entry_for_request(request_id).await?;

    let break_time = match input.break_time {
        Some(t) => hours::round_time(t, context.round_up_target),
        None => Utc::now(),
    };
    check_break_bounds(&entry, break_time)?;

    let duration = input
        .duration_minutes
        .unwrap_or_else(|| input.break_type.default_duration_minutes());
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "Break duration must be positive".to_string(),
        ));
    }

    let meal_break =
        time_entry_repo::add_break(entry.id, break_time, input.break_type, duration).await?;

    Ok(ApiResponse::created(meal_break))
}

pub async fn update_meal_break(
    path: web::Path<(Uuid, Uuid)>,
    input: web::Json<UpdateMealBreakRequest>,
) -> Result<HttpResponse, AppError> {
    let (request_id, break_id) = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;
    let entry = entry_for_request(request_id).await?;

    let existing = time_entry_repo::find_break(break_id)
        .await?
        .filter(|b| b.time_entry_id == entry.id)
        .ok_or_else(|| AppError::NotFound("Meal break not found".to_string()))?;

    let break_time = hours::round_time(input.break_time, context.round_up_target);
    check_break_bounds(&entry, break_time)?;

    let duration = input
        .duration_minutes
        .unwrap_or_else(|| input.break_type.default_duration_minutes());
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "Break duration must be positive".to_string(),
        ));
    }

    let meal_break =
        time_entry_repo::update_break(existing.id, break_time, input.break_type, duration)
            .await?
            .ok_or_else(|| AppError::NotFound("Meal break not found".to_string()))?;

    Ok(ApiResponse::success(meal_break))
}

pub async fn delete_meal_break(path: web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError> {
    let (request_id, break_id) = path.into_inner();
    let entry = entry_for_request(request_id).await?;

    let existing = time_entry_repo::find_break(break_id)
        .await?
        .filter(|b| b.time_entry_id == entry.id)
        .ok_or_else(|| AppError::NotFound("Meal break not found".to_string()))?;

    time_entry_repo::delete_break(existing.id).await?;

    Ok(ApiResponse::<()>::success_with_message(None, "Meal break deleted"))
}

pub async fn get_time_entry(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let entry = entry_for_request(path.into_inner()).await?;
    let breaks = time_entry_repo::breaks(entry.id).await?;

    Ok(ApiResponse::success(TimeEntryResponse { entry, breaks }))
}

/// The three derived figures; nothing is stored, so edits to times or breaks
/// show up here immediately.
pub async fn get_hours(path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let request_id = path.into_inner();
    let context = policy::for_labor_request(request_id).await?;
    let entry = entry_for_request(request_id).await?;
    let breaks = time_entry_repo::breaks(entry.id).await?;

    let sheet = TimeSheet::new(&entry, breaks);
    Ok(ApiResponse::success(
        sheet.derive(context.meal_penalty_trigger_hours),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    fn call_time(h: u32, m: u32) -> CallTime {
        CallTime {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Load in".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            minimum_hours: None,
            created_at: at(0, 0),
        }
    }

    fn entry(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> TimeEntry {
        TimeEntry {
            id: Uuid::new_v4(),
            labor_request_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            call_time_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            created_at: at(0, 0),
        }
    }

    #[test]
    fn clock_in_rounds_the_scheduled_call_time() {
        assert_eq!(scheduled_clock_in(&call_time(7, 58), 30), at(8, 0));
        assert_eq!(scheduled_clock_in(&call_time(8, 10), 30), at(8, 0));
    }

    #[test]
    fn clock_in_keeps_an_already_even_call_time() {
        assert_eq!(scheduled_clock_in(&call_time(8, 0), 30), at(8, 0));
        assert_eq!(scheduled_clock_in(&call_time(16, 15), 15), at(16, 15));
    }

    #[test]
    fn start_edit_must_come_before_the_end() {
        let err = validate_start_edit(at(17, 0), Some(at(16, 0))).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));

        let err = validate_start_edit(at(16, 0), Some(at(16, 0))).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));
    }

    #[test]
    fn start_edit_passes_before_the_end_or_with_no_end() {
        assert!(validate_start_edit(at(8, 0), Some(at(16, 0))).is_ok());
        assert!(validate_start_edit(at(8, 0), None).is_ok());
    }

    #[test]
    fn end_edit_requires_a_start() {
        let err = validate_end_edit(at(16, 0), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));
    }

    #[test]
    fn end_edit_must_come_after_the_start() {
        let err = validate_end_edit(at(7, 0), Some(at(8, 0))).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));

        let err = validate_end_edit(at(8, 0), Some(at(8, 0))).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));

        assert!(validate_end_edit(at(16, 0), Some(at(8, 0))).is_ok());
    }

    #[test]
    fn breaks_outside_the_shift_are_rejected() {
        let entry = entry(Some(at(8, 0)), Some(at(16, 0)));

        let err = check_break_bounds(&entry, at(7, 30)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));

        let err = check_break_bounds(&entry, at(16, 30)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));

        assert!(check_break_bounds(&entry, at(12, 0)).is_ok());
    }

    #[test]
    fn break_bounds_only_apply_to_recorded_times() {
        let open = entry(Some(at(8, 0)), None);
        assert!(check_break_bounds(&open, at(23, 0)).is_ok());

        let err = check_break_bounds(&open, at(7, 0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeFormat(_)));
    }
}
