use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::AssignmentState;
use crate::database::repositories::request::{self, QueuedRequest};
use crate::database::utils::sql;
use crate::error::AppError;

/// What the core hands to the delivery collaborator. Delivery (SMS/push) and
/// its success tracking happen outside; the core only records the intent and
/// never depends on the outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIntent {
    pub labor_request_id: Uuid,
    pub state: AssignmentState,
    pub message: String,
}

impl NotificationIntent {
    pub fn new(labor_request_id: Uuid, state: AssignmentState, message: impl Into<String>) -> Self {
        NotificationIntent {
            labor_request_id,
            state,
            message: message.into(),
        }
    }
}

pub async fn record_tx(
    tx: &mut Transaction<'_, Postgres>,
    intent: &NotificationIntent,
) -> Result<(), AppError> {
    sqlx::query(&sql(r#"
            INSERT INTO
                notifications (labor_request_id, state, message)
            VALUES
                (?, ?, ?)
        "#))
    .bind(intent.labor_request_id)
    .bind(intent.state.to_string())
    .bind(&intent.message)
    .execute(&mut **tx)
    .await?;

    log::info!(
        "Notification intent for request {}: {} ({})",
        intent.labor_request_id,
        intent.state,
        intent.message
    );

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub queued: usize,
    pub sent: usize,
    pub errors: Vec<String>,
}

fn request_message(queued: &QueuedRequest, config: &Config) -> String {
    format!(
        "You are requested for {}\n{} - {} at {} on {}\nRespond: {}",
        queued.labor_type,
        queued.event_name,
        queued.call_time_name,
        queued.call_time.format("%I:%M %p"),
        queued.call_date.format("%B %d"),
        config.response_link(&queued.token_short),
    )
}

/// Emit an availability-request intent for every queued, not-yet-notified
/// worker on a call time. Per-worker failures are collected as strings and the
/// rest of the batch still goes through; nothing here touches assignment
/// state.
pub async fn dispatch_queued(call_time_id: Uuid, config: &Config) -> Result<DispatchSummary, AppError> {
    let queued = request::queued_for_call_time(call_time_id).await?;

    let mut summary = DispatchSummary {
        queued: queued.len(),
        sent: 0,
        errors: Vec::new(),
    };

    for item in &queued {
        let intent = NotificationIntent::new(
            item.labor_request_id,
            AssignmentState::Pending,
            request_message(item, config),
        );
        let result: Result<(), AppError> = async {
            sqlx::query(&sql(r#"
                    INSERT INTO
                        notifications (labor_request_id, state, message)
                    VALUES
                        (?, ?, ?)
                "#))
            .bind(intent.labor_request_id)
            .bind(intent.state.to_string())
            .bind(&intent.message)
            .execute(crate::database::pool())
            .await?;
            request::mark_notified(item.labor_request_id).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => summary.sent += 1,
            Err(e) => summary
                .errors
                .push(format!("Failed to notify {}: {}", item.worker_name, e)),
        }
    }

    Ok(summary)
}
