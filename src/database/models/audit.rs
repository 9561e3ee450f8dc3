use uuid::Uuid;

/// Append-only audit entry. No read path is exposed by the core.
#[derive(Debug, Clone)]
pub struct AuditInput {
    pub actor: Uuid,
    pub action: &'static str,
    pub resource_type: &'static str,
    pub resource_id: Uuid,
    pub details: serde_json::Value,
}

pub mod actions {
    pub const CREATE_REQUEST: &str = "create_request";
    pub const APPROVE_REQUEST: &str = "approve_request";
    pub const REJECT_REQUEST: &str = "reject_request";
    pub const CANCEL_REQUEST: &str = "cancel_request";
}

pub const RESOURCE_SHIFT_REQUEST: &str = "shift_request";
