use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::{
    models::{CallTime, Event},
    pool,
    utils::sql,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub company_id: Uuid,
    pub location_id: Option<Uuid>,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTimeInput {
    pub event_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub minimum_hours: Option<f64>,
}

pub async fn create(input: &EventInput) -> Result<Event> {
    let event = sqlx::query_as::<_, Event>(&sql(r#"
            INSERT INTO
                events (company_id, location_id, name, start_date, end_date)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                company_id,
                location_id,
                name,
                start_date,
                end_date,
                created_at
        "#))
    .bind(input.company_id)
    .bind(input.location_id)
    .bind(&input.name)
    .bind(input.start_date)
    .bind(input.end_date)
    .fetch_one(pool())
    .await?;

    Ok(event)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(event)
}

pub async fn create_call_time(input: &CallTimeInput) -> Result<CallTime> {
    let call_time = sqlx::query_as::<_, CallTime>(&sql(r#"
            INSERT INTO
                call_times (event_id, name, date, time, minimum_hours)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                event_id,
                name,
                date,
                time,
                minimum_hours,
                created_at
        "#))
    .bind(input.event_id)
    .bind(&input.name)
    .bind(input.date)
    .bind(input.time)
    .bind(input.minimum_hours)
    .fetch_one(pool())
    .await?;

    Ok(call_time)
}

pub async fn find_call_time(id: Uuid) -> Result<Option<CallTime>> {
    let call_time = sqlx::query_as::<_, CallTime>("SELECT * FROM call_times WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(call_time)
}

/// The scheduled call behind a labor request; clock-in stamps its date+time.
pub async fn call_time_for_request(labor_request_id: Uuid) -> Result<Option<CallTime>> {
    let call_time = sqlx::query_as::<_, CallTime>(&sql(r#"
            SELECT
                ct.id,
                ct.event_id,
                ct.name,
                ct.date,
                ct.time,
                ct.minimum_hours,
                ct.created_at
            FROM
                call_times ct
                JOIN labor_requirements lr ON lr.call_time_id = ct.id
                JOIN labor_requests req ON req.requirement_id = lr.id
            WHERE
                req.id = ?
        "#))
    .bind(labor_request_id)
    .fetch_optional(pool())
    .await?;

    Ok(call_time)
}
