use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-in/out record for one confirmed request. The hour figures are never
/// stored; `services::hours` derives them on read.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub labor_request_id: Uuid,
    pub worker_id: Uuid,
    pub call_time_id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealBreak {
    pub id: Uuid,
    pub time_entry_id: Uuid,
    pub break_time: DateTime<Utc>,
    pub break_type: BreakType,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakType {
    Paid,
    Unpaid,
}

impl BreakType {
    /// Paid breaks are a fixed half hour, unpaid a fixed hour unless a manual
    /// edit supplies a duration.
    pub fn default_duration_minutes(&self) -> i32 {
        match self {
            BreakType::Paid => 30,
            BreakType::Unpaid => 60,
        }
    }
}

impl std::fmt::Display for BreakType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakType::Paid => write!(f, "paid"),
            BreakType::Unpaid => write!(f, "unpaid"),
        }
    }
}

impl std::str::FromStr for BreakType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paid" => Ok(BreakType::Paid),
            "unpaid" => Ok(BreakType::Unpaid),
            _ => Err(format!("Invalid break type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for BreakType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for BreakType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for BreakType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse::<BreakType>().map_err(|e| e.into())
    }
}
