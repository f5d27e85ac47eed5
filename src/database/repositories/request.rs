use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::LaborRequest, pool, utils::sql};

const REQUEST_COLUMNS: &str = r#"
    id,
    worker_id,
    requirement_id,
    requested,
    notified,
    availability_response,
    confirmed,
    is_reserved,
    fcfs_claim,
    ncns,
    cancelled,
    responded_at,
    token_short,
    created_at
"#;

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Put a worker on a slot's roster, or re-request them if a row already
/// exists. Requeueing never clears an existing response or confirmation; it
/// may flip the reserved flag.
pub async fn queue_worker(
    requirement_id: Uuid,
    worker_id: Uuid,
    is_reserved: bool,
) -> Result<LaborRequest> {
    let request = sqlx::query_as::<_, LaborRequest>(&sql(&format!(
        r#"
            INSERT INTO
                labor_requests (worker_id, requirement_id, requested, is_reserved, token_short)
            VALUES
                (?, ?, TRUE, ?, ?)
            ON CONFLICT (worker_id, requirement_id) DO UPDATE
            SET
                requested = TRUE,
                is_reserved = EXCLUDED.is_reserved
            RETURNING {REQUEST_COLUMNS}
        "#
    )))
    .bind(worker_id)
    .bind(requirement_id)
    .bind(is_reserved)
    .bind(generate_token())
    .fetch_one(pool())
    .await?;

    Ok(request)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<LaborRequest>> {
    let request = sqlx::query_as::<_, LaborRequest>("SELECT * FROM labor_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(request)
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<LaborRequest>> {
    let request = sqlx::query_as::<_, LaborRequest>("SELECT * FROM labor_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(request)
}

pub async fn find_by_token_tx(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> Result<Option<LaborRequest>> {
    let request =
        sqlx::query_as::<_, LaborRequest>("SELECT * FROM labor_requests WHERE token_short = $1")
            .bind(token)
            .fetch_optional(&mut **tx)
            .await?;

    Ok(request)
}

/// Every request on a requirement, oldest first. Creation order is the final
/// tie-break key for first-come-first-served promotion, so the ordering here
/// is load-bearing.
pub async fn roster(requirement_id: Uuid) -> Result<Vec<LaborRequest>> {
    let requests = sqlx::query_as::<_, LaborRequest>(
        "SELECT * FROM labor_requests WHERE requirement_id = $1 ORDER BY created_at, id",
    )
    .bind(requirement_id)
    .fetch_all(pool())
    .await?;

    Ok(requests)
}

pub async fn roster_tx(
    tx: &mut Transaction<'_, Postgres>,
    requirement_id: Uuid,
) -> Result<Vec<LaborRequest>> {
    let requests = sqlx::query_as::<_, LaborRequest>(
        "SELECT * FROM labor_requests WHERE requirement_id = $1 ORDER BY created_at, id",
    )
    .bind(requirement_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(requests)
}

/// Write every transition-owned flag back. Identity columns and the token are
/// never touched here.
pub async fn persist_tx(
    tx: &mut Transaction<'_, Postgres>,
    request: &LaborRequest,
) -> Result<()> {
    sqlx::query(&sql(r#"
            UPDATE labor_requests
            SET
                requested = ?,
                notified = ?,
                availability_response = ?,
                confirmed = ?,
                is_reserved = ?,
                fcfs_claim = ?,
                ncns = ?,
                cancelled = ?,
                responded_at = ?
            WHERE
                id = ?
        "#))
    .bind(request.requested)
    .bind(request.notified)
    .bind(request.availability_response)
    .bind(request.confirmed)
    .bind(request.is_reserved)
    .bind(request.fcfs_claim)
    .bind(request.ncns)
    .bind(request.cancelled)
    .bind(request.responded_at)
    .bind(request.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM labor_requests WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_notified(id: Uuid) -> Result<()> {
    sqlx::query("UPDATE labor_requests SET notified = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool())
        .await?;

    Ok(())
}

/// A queued request joined with everything the dispatch message needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueuedRequest {
    pub labor_request_id: Uuid,
    pub worker_name: String,
    pub token_short: String,
    pub labor_type: String,
    pub event_name: String,
    pub call_time_name: String,
    pub call_date: NaiveDate,
    pub call_time: NaiveTime,
}

pub async fn queued_for_call_time(call_time_id: Uuid) -> Result<Vec<QueuedRequest>> {
    let queued = sqlx::query_as::<_, QueuedRequest>(&sql(r#"
            SELECT
                req.id AS labor_request_id,
                w.name AS worker_name,
                req.token_short,
                lr.labor_type,
                e.name AS event_name,
                ct.name AS call_time_name,
                ct.date AS call_date,
                ct.time AS call_time
            FROM
                labor_requests req
                JOIN workers w ON w.id = req.worker_id
                JOIN labor_requirements lr ON lr.id = req.requirement_id
                JOIN call_times ct ON ct.id = lr.call_time_id
                JOIN events e ON e.id = ct.event_id
            WHERE
                ct.id = ?
                AND req.requested
                AND NOT req.notified
                AND NOT req.cancelled
            ORDER BY
                req.created_at
        "#))
    .bind(call_time_id)
    .fetch_all(pool())
    .await?;

    Ok(queued)
}
