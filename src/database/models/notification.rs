use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub recipient: Uuid,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
}

pub mod kinds {
    pub const SHIFT_REQUEST: &str = "shift_request";
    pub const SHIFT_ASSIGNED: &str = "shift_assigned";
    pub const SHIFT_CANCELLED: &str = "shift_cancelled";
    pub const REQUEST_APPROVED: &str = "request_approved";
    pub const REQUEST_REJECTED: &str = "request_rejected";
}
