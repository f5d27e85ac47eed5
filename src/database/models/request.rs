use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One worker's standing against one labor requirement. Mutated exclusively
/// through `services::assignment`; the boolean flags together derive the
/// `AssignmentState` reported outward.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LaborRequest {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub requirement_id: Uuid,
    pub requested: bool,
    pub notified: bool,
    pub availability_response: Option<Availability>,
    pub confirmed: bool,
    pub is_reserved: bool,
    /// Set when this confirmation consumed a slot of the FCFS budget; reserved
    /// confirmations never set it.
    pub fcfs_claim: bool,
    pub ncns: bool,
    pub cancelled: bool,
    pub responded_at: Option<DateTime<Utc>>,
    pub token_short: String,
    pub created_at: DateTime<Utc>,
}

impl LaborRequest {
    pub fn state(&self) -> AssignmentState {
        if self.ncns {
            AssignmentState::NoCallNoShow
        } else if self.cancelled {
            AssignmentState::Cancelled
        } else if self.confirmed {
            AssignmentState::Confirmed
        } else {
            match self.availability_response {
                Some(Availability::Yes) => AssignmentState::Available,
                Some(Availability::No) => AssignmentState::Declined,
                None => AssignmentState::Pending,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Yes,
    No,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Yes => write!(f, "yes"),
            Availability::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(Availability::Yes),
            "no" => Ok(Availability::No),
            _ => Err(format!("Invalid availability response: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for Availability {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for Availability {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Availability {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse::<Availability>().map_err(|e| e.into())
    }
}

/// The states a ledger entry moves through. Derived from the persisted flags,
/// reported in rosters and notification intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentState {
    Pending,
    Available,
    Confirmed,
    Declined,
    Cancelled,
    NoCallNoShow,
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentState::Pending => write!(f, "pending"),
            AssignmentState::Available => write!(f, "available"),
            AssignmentState::Confirmed => write!(f, "confirmed"),
            AssignmentState::Declined => write!(f, "declined"),
            AssignmentState::Cancelled => write!(f, "cancelled"),
            AssignmentState::NoCallNoShow => write!(f, "ncns"),
        }
    }
}

/// Worker- and manager-initiated actions against a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum AssignmentAction {
    Respond { response: Availability },
    Confirm,
    Decline,
    Cancel { with_penalty: bool },
    MarkNoCallNoShow,
    MarkShowedUp,
    Delete,
}
