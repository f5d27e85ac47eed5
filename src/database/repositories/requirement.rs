use anyhow::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{LaborRequirement, LaborRequirementInput},
    pool,
    utils::sql,
};

pub async fn create(input: &LaborRequirementInput) -> Result<LaborRequirement> {
    let requirement = sqlx::query_as::<_, LaborRequirement>(&sql(r#"
            INSERT INTO
                labor_requirements (
                    call_time_id,
                    labor_type,
                    needed_positions,
                    fcfs_positions,
                    minimum_hours
                )
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                call_time_id,
                labor_type,
                needed_positions,
                fcfs_positions,
                minimum_hours,
                created_at
        "#))
    .bind(input.call_time_id)
    .bind(&input.labor_type)
    .bind(input.needed_positions.max(0))
    .bind(input.clamped_fcfs())
    .bind(input.minimum_hours)
    .fetch_one(pool())
    .await?;

    Ok(requirement)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<LaborRequirement>> {
    let requirement =
        sqlx::query_as::<_, LaborRequirement>("SELECT * FROM labor_requirements WHERE id = $1")
            .bind(id)
            .fetch_optional(pool())
            .await?;

    Ok(requirement)
}

pub async fn find_by_call_time(call_time_id: Uuid) -> Result<Vec<LaborRequirement>> {
    let requirements = sqlx::query_as::<_, LaborRequirement>(
        "SELECT * FROM labor_requirements WHERE call_time_id = $1 ORDER BY labor_type",
    )
    .bind(call_time_id)
    .fetch_all(pool())
    .await?;

    Ok(requirements)
}

pub async fn update(id: Uuid, input: &LaborRequirementInput) -> Result<Option<LaborRequirement>> {
    let requirement = sqlx::query_as::<_, LaborRequirement>(&sql(r#"
            UPDATE labor_requirements
            SET
                labor_type = ?,
                needed_positions = ?,
                fcfs_positions = ?,
                minimum_hours = ?
            WHERE
                id = ?
            RETURNING
                id,
                call_time_id,
                labor_type,
                needed_positions,
                fcfs_positions,
                minimum_hours,
                created_at
        "#))
    .bind(&input.labor_type)
    .bind(input.needed_positions.max(0))
    .bind(input.clamped_fcfs())
    .bind(input.minimum_hours)
    .bind(id)
    .fetch_optional(pool())
    .await?;

    Ok(requirement)
}

/// Set the FCFS budget on its own, clamped into [0, needed_positions] in SQL
/// so concurrent capacity edits cannot leave it out of range.
pub async fn set_fcfs(id: Uuid, fcfs_positions: i32) -> Result<Option<LaborRequirement>> {
    let requirement = sqlx::query_as::<_, LaborRequirement>(&sql(r#"
            UPDATE labor_requirements
            SET
                fcfs_positions = LEAST(GREATEST(?, 0), needed_positions)
            WHERE
                id = ?
            RETURNING
                id,
                call_time_id,
                labor_type,
                needed_positions,
                fcfs_positions,
                minimum_hours,
                created_at
        "#))
    .bind(fcfs_positions)
    .bind(id)
    .fetch_optional(pool())
    .await?;

    Ok(requirement)
}

pub async fn delete(id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM labor_requirements WHERE id = $1")
        .bind(id)
        .execute(pool())
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Lease the requirement row for the rest of the transaction. Capacity checks
/// and promotions for one slot are serialized behind this lock.
pub async fn lock_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<LaborRequirement>> {
    let requirement = sqlx::query_as::<_, LaborRequirement>(
        "SELECT * FROM labor_requirements WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(requirement)
}
