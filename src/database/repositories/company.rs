use anyhow::Result;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::{
    models::{Company, LocationProfile},
    pool,
    utils::sql,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: String,
    pub minimum_hours: Option<f64>,
    pub meal_penalty_trigger_hours: Option<f64>,
    pub round_up_target: Option<i32>,
    pub hour_round_up: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProfileInput {
    pub company_id: Uuid,
    pub name: String,
    pub minimum_hours: Option<f64>,
    pub meal_penalty_trigger_hours: Option<f64>,
    pub round_up_target: Option<i32>,
    pub hour_round_up: Option<i32>,
}

pub async fn create(input: &CompanyInput) -> Result<Company> {
    let company = sqlx::query_as::<_, Company>(&sql(r#"
            INSERT INTO
                companies (
                    name,
                    minimum_hours,
                    meal_penalty_trigger_hours,
                    round_up_target,
                    hour_round_up
                )
            VALUES
                (
                    ?,
                    COALESCE(?, 4.0),
                    COALESCE(?, 5.0),
                    COALESCE(?, 30),
                    COALESCE(?, 4)
                )
            RETURNING
                id,
                name,
                minimum_hours,
                meal_penalty_trigger_hours,
                round_up_target,
                hour_round_up,
                created_at
        "#))
    .bind(&input.name)
    .bind(input.minimum_hours)
    .bind(input.meal_penalty_trigger_hours)
    .bind(input.round_up_target)
    .bind(input.hour_round_up)
    .fetch_one(pool())
    .await?;

    Ok(company)
}

pub async fn find_by_id(id: Uuid) -> Result<Option<Company>> {
    let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool())
        .await?;

    Ok(company)
}

pub async fn create_location(input: &LocationProfileInput) -> Result<LocationProfile> {
    let location = sqlx::query_as::<_, LocationProfile>(&sql(r#"
            INSERT INTO
                location_profiles (
                    company_id,
                    name,
                    minimum_hours,
                    meal_penalty_trigger_hours,
                    round_up_target,
                    hour_round_up
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                company_id,
                name,
                minimum_hours,
                meal_penalty_trigger_hours,
                round_up_target,
                hour_round_up,
                created_at
        "#))
    .bind(input.company_id)
    .bind(&input.name)
    .bind(input.minimum_hours)
    .bind(input.meal_penalty_trigger_hours)
    .bind(input.round_up_target)
    .bind(input.hour_round_up)
    .fetch_one(pool())
    .await?;

    Ok(location)
}
