use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Company-level policy defaults. Locations and call times may override any of
/// them; resolution happens once per operation in `services::policy`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub minimum_hours: f64,
    pub meal_penalty_trigger_hours: f64,
    pub round_up_target: i32,
    pub hour_round_up: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LocationProfile {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub minimum_hours: Option<f64>,
    pub meal_penalty_trigger_hours: Option<f64>,
    pub round_up_target: Option<i32>,
    pub hour_round_up: Option<i32>,
    pub created_at: DateTime<Utc>,
}
