use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Option<Uuid>,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A scheduled call on an event, e.g. "Pre Rig" at 08:00.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CallTime {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub minimum_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl CallTime {
    /// Scheduled start as a single datetime; clock-in records this, not "now".
    pub fn scheduled_start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}
