use anyhow::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{Worker, WorkerInput},
    pool,
    utils::sql,
};

pub async fn create(input: &WorkerInput) -> Result<Worker> {
    let worker = sqlx::query_as::<_, Worker>(&sql(r#"
            INSERT INTO
                workers (company_id, name, phone_number)
            VALUES
                (?, ?, ?)
            RETURNING
                id,
                company_id,
                name,
                phone_number,
                no_call_no_show_count,
                created_at
        "#))
    .bind(input.company_id)
    .bind(&input.name)
    .bind(&input.phone_number)
    .fetch_one(pool())
    .await?;

    Ok(worker)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<Worker>> {
    let worker = sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(worker)
}

pub async fn find_by_company(company_id: Uuid) -> Result<Vec<Worker>> {
    let workers =
        sqlx::query_as::<_, Worker>("SELECT * FROM workers WHERE company_id = $1 ORDER BY name")
            .bind(company_id)
            .fetch_all(pool())
            .await?;

    Ok(workers)
}

/// Move the penalty counter by a signed delta, never below zero.
pub async fn adjust_ncns_count_tx(
    tx: &mut Transaction<'_, Postgres>,
    worker_id: Uuid,
    delta: i32,
) -> Result<()> {
    sqlx::query(&sql(r#"
            UPDATE workers
            SET
                no_call_no_show_count = GREATEST(no_call_no_show_count + ?, 0)
            WHERE
                id = ?
        "#))
    .bind(delta)
    .bind(worker_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
