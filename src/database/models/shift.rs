use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub department: String,
    pub required_employees: i64,
    pub hourly_rate: f64,
    pub location: String,
    pub status: ShiftStatus,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl Shift {
    /// Shift length in hours, clamped at zero.
    pub fn duration_hours(&self) -> f64 {
        let minutes = (self.end_time - self.start_time).num_minutes();
        (minutes as f64 / 60.0).max(0.0)
    }
}

/// Payload for creating a shift. Missing optional fields take the
/// store defaults (department "General", one required employee, etc.).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub department: Option<String>,
    pub required_employees: Option<i64>,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub status: Option<ShiftStatus>,
    #[serde(default)]
    pub employees: Option<Vec<Uuid>>,
}

/// Partial update; only supplied fields are written. Supplying
/// `employees` replaces the full assignment set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub department: Option<String>,
    pub required_employees: Option<i64>,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub status: Option<ShiftStatus>,
    pub employees: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub employee_id: Uuid,
    pub confirmed: bool,
    pub confirmed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// An employee row as it appears inside a shift payload.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEmployee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub confirmed: bool,
}

/// Shift plus its employee list and derived confirmation fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDetail {
    #[serde(flatten)]
    pub shift: Shift,
    pub employees: Vec<AssignedEmployee>,
    pub confirmed_employees: Vec<Uuid>,
    pub confirmed_count: i64,
}

impl ShiftDetail {
    pub fn new(shift: Shift, employees: Vec<AssignedEmployee>) -> Self {
        let confirmed_employees: Vec<Uuid> = employees
            .iter()
            .filter(|e| e.confirmed)
            .map(|e| e.id)
            .collect();
        let confirmed_count = confirmed_employees.len() as i64;
        Self {
            shift,
            employees,
            confirmed_employees,
            confirmed_count,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftQuery {
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub department: Option<String>,
    pub status: Option<ShiftStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Draft,
    Published,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftStatus::Completed | ShiftStatus::Cancelled)
    }

    /// Allowed transitions: draft and published may move between each
    /// other and into a terminal state; terminal states never move.
    pub fn can_transition_to(&self, next: ShiftStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            ShiftStatus::Draft | ShiftStatus::Published => true,
            ShiftStatus::Completed | ShiftStatus::Cancelled => false,
        }
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftStatus::Draft => write!(f, "draft"),
            ShiftStatus::Published => write!(f, "published"),
            ShiftStatus::Completed => write!(f, "completed"),
            ShiftStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ShiftStatus::Draft),
            "published" => Ok(ShiftStatus::Published),
            "completed" => Ok(ShiftStatus::Completed),
            "cancelled" => Ok(ShiftStatus::Cancelled),
            _ => Err(format!("Invalid shift status: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for ShiftStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ShiftStatus {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&s, args)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ShiftStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse::<ShiftStatus>().map_err(|e| e.into())
    }
}

impl Default for ShiftStatus {
    fn default() -> Self {
        ShiftStatus::Published
    }
}
