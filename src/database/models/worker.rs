use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub phone_number: String,
    /// Running penalty counter; only the assignment transitions touch it.
    pub no_call_no_show_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInput {
    pub company_id: Uuid,
    pub name: String,
    pub phone_number: String,
}
