use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A labor-type slot on a call time, with its total capacity and the size of
/// the first-come-first-served sub-pool.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequirement {
    pub id: Uuid,
    pub call_time_id: Uuid,
    pub labor_type: String,
    pub needed_positions: i32,
    pub fcfs_positions: i32,
    pub minimum_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequirementInput {
    pub call_time_id: Uuid,
    pub labor_type: String,
    pub needed_positions: i32,
    #[serde(default)]
    pub fcfs_positions: i32,
    pub minimum_hours: Option<f64>,
}

impl LaborRequirementInput {
    /// FCFS positions can never exceed the slot's total capacity; clamp on
    /// every write rather than rejecting.
    pub fn clamped_fcfs(&self) -> i32 {
        self.fcfs_positions.clamp(0, self.needed_positions.max(0))
    }
}
