use uuid::Uuid;

use crate::database::models::{Role, Shift, ShiftRequest, User};
use crate::error::AppError;

/// The authenticated principal acting on the core, resolved from the
/// user directory at the boundary.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub department: String,
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        Actor {
            id: user.id,
            name: user.name,
            role: user.role,
            department: user.department,
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_manager_or_admin(&self) -> bool {
        matches!(self.role, Role::Manager | Role::Admin)
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Everything the core gates on, in one place.
pub enum Action<'a> {
    CreateShift,
    ManageShift(&'a Shift),
    ListReplacements,
    ReviewRequest(&'a ShiftRequest),
    CancelRequest(&'a ShiftRequest),
}

/// Single allow/deny decision point for (actor, action, resource).
/// Shift update/delete is creator-or-admin; request review is the
/// assigned approver or an admin; request cancel is the requester or
/// an admin.
pub fn authorize(actor: &Actor, action: Action<'_>) -> Result<(), AppError> {
    let allowed = match action {
        Action::CreateShift | Action::ListReplacements => actor.is_manager_or_admin(),
        Action::ManageShift(shift) => {
            actor.is_admin() || shift.created_by == Some(actor.id)
        }
        Action::ReviewRequest(request) => {
            actor.is_admin()
                || (actor.is_manager_or_admin() && request.assigned_to == Some(actor.id))
        }
        Action::CancelRequest(request) => {
            actor.is_admin() || request.requested_by == actor.id
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Not authorized to perform this action".to_string(),
        ))
    }
}
