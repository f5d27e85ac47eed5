use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{BreakType, MealBreak, TimeEntry},
    pool,
    utils::sql,
};

const ENTRY_COLUMNS: &str = r#"
    id,
    labor_request_id,
    worker_id,
    call_time_id,
    start_time,
    end_time,
    created_at
"#;

/// One time entry per labor request; the upsert returns the existing row when
/// a second clock-in races the first.
pub async fn get_or_create_tx(
    tx: &mut Transaction<'_, Postgres>,
    labor_request_id: Uuid,
) -> Result<TimeEntry> {
    let entry = sqlx::query_as::<_, TimeEntry>(&sql(&format!(
        r#"
            INSERT INTO
                time_entries (labor_request_id, worker_id, call_time_id)
            SELECT
                req.id,
                req.worker_id,
                lr.call_time_id
            FROM
                labor_requests req
                JOIN labor_requirements lr ON lr.id = req.requirement_id
            WHERE
                req.id = ?
            ON CONFLICT (labor_request_id) DO UPDATE
            SET
                labor_request_id = EXCLUDED.labor_request_id
            RETURNING {ENTRY_COLUMNS}
        "#
    )))
    .bind(labor_request_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(entry)
}

pub async fn find_by_request(labor_request_id: Uuid) -> Result<Option<TimeEntry>> {
    let entry =
        sqlx::query_as::<_, TimeEntry>("SELECT * FROM time_entries WHERE labor_request_id = $1")
            .bind(labor_request_id)
            .fetch_optional(pool())
            .await?;

    Ok(entry)
}

pub async fn set_start_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    start_time: DateTime<Utc>,
) -> Result<TimeEntry> {
    let entry = sqlx::query_as::<_, TimeEntry>(&sql(&format!(
        r#"
            UPDATE time_entries
            SET
                start_time = ?
            WHERE
                id = ?
            RETURNING {ENTRY_COLUMNS}
        "#
    )))
    .bind(start_time)
    .bind(entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(entry)
}

pub async fn set_end_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    end_time: DateTime<Utc>,
) -> Result<TimeEntry> {
    let entry = sqlx::query_as::<_, TimeEntry>(&sql(&format!(
        r#"
            UPDATE time_entries
            SET
                end_time = ?
            WHERE
                id = ?
            RETURNING {ENTRY_COLUMNS}
        "#
    )))
    .bind(end_time)
    .bind(entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(entry)
}

pub async fn breaks(entry_id: Uuid) -> Result<Vec<MealBreak>> {
    let breaks = sqlx::query_as::<_, MealBreak>(
        "SELECT * FROM meal_breaks WHERE time_entry_id = $1 ORDER BY break_time, created_at",
    )
    .bind(entry_id)
    .fetch_all(pool())
    .await?;

    Ok(breaks)
}

pub async fn add_break(
    entry_id: Uuid,
    break_time: DateTime<Utc>,
    break_type: BreakType,
    duration_minutes: i32,
) -> Result<MealBreak> {
    let meal_break = sqlx::query_as::<_, MealBreak>(&sql(r#"
            INSERT INTO
                meal_breaks (time_entry_id, break_time, break_type, duration_minutes)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                time_entry_id,
                break_time,
                break_type,
                duration_minutes,
                created_at
        "#))
    .bind(entry_id)
    .bind(break_time)
    .bind(break_type)
    .bind(duration_minutes)
    .fetch_one(pool())
    .await?;

    Ok(meal_break)
}

pub async fn find_break(id: Uuid) -> Result<Option<MealBreak>> {
    let meal_break = sqlx::query_as::<_, MealBreak>("SELECT * FROM meal_breaks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(meal_break)
}

pub async fn update_break(
    id: Uuid,
    break_time: DateTime<Utc>,
    break_type: BreakType,
    duration_minutes: i32,
) -> Result<Option<MealBreak>> {
    let meal_break = sqlx::query_as::<_, MealBreak>(&sql(r#"
            UPDATE meal_breaks
            SET
                break_time = ?,
                break_type = ?,
                duration_minutes = ?
            WHERE
                id = ?
            RETURNING
                id,
                time_entry_id,
                break_time,
                break_type,
                duration_minutes,
                created_at
        "#))
    .bind(break_time)
    .bind(break_type)
    .bind(duration_minutes)
    .bind(id)
    .fetch_optional(pool())
    .await?;

    Ok(meal_break)
}

pub async fn delete_break(id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM meal_breaks WHERE id = $1")
        .bind(id)
        .execute(pool())
        .await?;

    Ok(result.rows_affected() > 0)
}
