use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    audit::{actions, RESOURCE_SHIFT_REQUEST},
    notification::kinds,
    AuditInput, NotificationInput, RequestQuery, RequestStatus, RequestType, Role, Shift,
    ShiftRequest, ShiftRequestInput,
};
use crate::database::repositories::{
    request::RequestScope, AuditRepository, NotificationRepository, RequestRepository,
    ShiftRepository, UserRepository,
};
use crate::error::AppError;
use crate::services::authorization::{authorize, Action, Actor};

/// The request workflow engine: employee-initiated swap/change/cancel
/// requests and their pending/approved/rejected/cancelled lifecycle.
#[derive(Clone)]
pub struct RequestService {
    pool: SqlitePool,
    requests: RequestRepository,
    shifts: ShiftRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    audit: AuditRepository,
}

impl RequestService {
    pub fn new(
        pool: SqlitePool,
        requests: RequestRepository,
        shifts: ShiftRepository,
        users: UserRepository,
        notifications: NotificationRepository,
        audit: AuditRepository,
    ) -> Self {
        Self {
            pool,
            requests,
            shifts,
            users,
            notifications,
            audit,
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: ShiftRequestInput,
    ) -> Result<ShiftRequest, AppError> {
        let shift = self.require_shift(input.shift_id).await?;

        let assignment = self.shifts.find_assignment(shift.id, actor.id).await?;
        if assignment.is_none() {
            return Err(AppError::Authorization(
                "You are not assigned to this shift".to_string(),
            ));
        }

        if self.requests.has_pending(shift.id, actor.id).await? {
            return Err(AppError::Conflict(
                "You already have a pending request for this shift".to_string(),
            ));
        }

        if input.request_type == RequestType::Change {
            let (start, end) = match (input.proposed_start_time, input.proposed_end_time) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(AppError::Validation(
                        "Proposed start and end times are required for change requests"
                            .to_string(),
                    ))
                }
            };
            if end <= start {
                return Err(AppError::Validation(
                    "Proposed end time must be after start time".to_string(),
                ));
            }
        }

        let assigned_to = self.resolve_approver(&shift).await?;
        // The pending check above races with concurrent creators; the
        // partial unique index on (shift_id, requested_by) is the
        // actual guard, surfaced here as the same conflict.
        let request = match self
            .requests
            .create_request(&input, actor.id, assigned_to)
            .await
        {
            Ok(request) => request,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(
                    "You already have a pending request for this shift".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        self.audit
            .append(AuditInput {
                actor: actor.id,
                action: actions::CREATE_REQUEST,
                resource_type: RESOURCE_SHIFT_REQUEST,
                resource_id: request.id,
                details: serde_json::json!({
                    "requestType": request.request_type.to_string(),
                    "reason": request.reason,
                }),
            })
            .await?;

        if let Some(approver) = assigned_to {
            self.notify_quietly(NotificationInput {
                recipient: approver,
                kind: kinds::SHIFT_REQUEST,
                title: "New Shift Request".to_string(),
                message: format!(
                    "{} requested to {} shift \"{}\"",
                    actor.name, request.request_type, shift.title
                ),
                related_id: Some(request.id),
            })
            .await;
        }

        Ok(request)
    }

    /// Approve a pending request. The status flip, the per-type shift
    /// mutation and the audit entry commit in one transaction; the
    /// status flip goes first so a concurrent approver loses cleanly.
    pub async fn approve(
        &self,
        actor: &Actor,
        request_id: Uuid,
        replacement_employee_id: Option<Uuid>,
    ) -> Result<ShiftRequest, AppError> {
        let request = self.require_request(request_id).await?;
        let shift = self.require_shift(request.shift_id).await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::State(format!(
                "Cannot approve a {} request",
                request.status
            )));
        }
        authorize(actor, Action::ReviewRequest(&request))?;

        // Swap-specific checks that need no lock: the target must be a
        // real, assignable directory entry.
        let replacement = match request.request_type {
            RequestType::Swap => {
                let id = replacement_employee_id.ok_or_else(|| {
                    AppError::Validation(
                        "Replacement employee is required for swap requests".to_string(),
                    )
                })?;
                let user = self
                    .users
                    .find_assignable(id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Replacement employee not found".to_string())
                    })?;
                Some(user)
            }
            _ => None,
        };

        let mut tx = self.pool.begin().await?;

        let flipped =
            RequestRepository::approve_tx(&mut tx, request.id, replacement.as_ref().map(|u| u.id))
                .await?;
        if flipped == 0 {
            tx.rollback().await?;
            return Err(AppError::State(
                "Cannot approve a request that is no longer pending".to_string(),
            ));
        }

        let mut notifications: Vec<NotificationInput> = Vec::new();

        match request.request_type {
            RequestType::Swap => {
                let Some(replacement) = replacement.as_ref() else {
                    tx.rollback().await?;
                    return Err(AppError::Internal(
                        "Swap approval reached without a replacement".to_string(),
                    ));
                };

                if ShiftRepository::assignment_exists_tx(&mut tx, shift.id, replacement.id).await? {
                    tx.rollback().await?;
                    return Err(AppError::Conflict(
                        "Replacement employee is already assigned to this shift".to_string(),
                    ));
                }
                if let Some(title) = ShiftRepository::overlap_conflict_tx(
                    &mut tx,
                    replacement.id,
                    shift.id,
                    shift.start_time,
                    shift.end_time,
                )
                .await?
                {
                    tx.rollback().await?;
                    return Err(AppError::Conflict(format!(
                        "Replacement employee has a conflict with shift: {}",
                        title
                    )));
                }

                // A swap trades one assignment for another; if the
                // requester was unassigned since filing, there is
                // nothing left to trade away.
                if !ShiftRepository::remove_assignment_tx(&mut tx, shift.id, request.requested_by)
                    .await?
                {
                    tx.rollback().await?;
                    return Err(AppError::Conflict(
                        "Requester no longer holds an assignment on this shift".to_string(),
                    ));
                }
                ShiftRepository::insert_assignment_tx(&mut tx, shift.id, replacement.id).await?;

                notifications.push(NotificationInput {
                    recipient: replacement.id,
                    kind: kinds::SHIFT_ASSIGNED,
                    title: "New Shift Assignment".to_string(),
                    message: format!(
                        "You've been assigned to cover \"{}\" on {}",
                        shift.title,
                        shift.start_time.date()
                    ),
                    related_id: Some(shift.id),
                });
            }
            RequestType::Change => {
                let (start, end) = match (request.proposed_start_time, request.proposed_end_time) {
                    (Some(start), Some(end)) => (start, end),
                    _ => {
                        tx.rollback().await?;
                        return Err(AppError::Validation(
                            "Proposed times are missing".to_string(),
                        ));
                    }
                };
                // Approved times are applied as-is; no collision
                // re-check against other employees' schedules.
                ShiftRepository::set_times_tx(&mut tx, shift.id, start, end).await?;
            }
            RequestType::Cancel => {
                ShiftRepository::set_status_tx(
                    &mut tx,
                    shift.id,
                    crate::database::models::ShiftStatus::Cancelled,
                )
                .await?;

                let assigned = ShiftRepository::assigned_employee_ids_tx(&mut tx, shift.id).await?;
                for employee_id in assigned {
                    if employee_id != request.requested_by {
                        notifications.push(NotificationInput {
                            recipient: employee_id,
                            kind: kinds::SHIFT_CANCELLED,
                            title: "Shift Cancelled".to_string(),
                            message: format!("Shift \"{}\" has been cancelled", shift.title),
                            related_id: Some(shift.id),
                        });
                    }
                }
            }
        }

        AuditRepository::append_tx(
            &mut tx,
            AuditInput {
                actor: actor.id,
                action: actions::APPROVE_REQUEST,
                resource_type: RESOURCE_SHIFT_REQUEST,
                resource_id: request.id,
                details: serde_json::json!({
                    "replacementEmployeeId": replacement.as_ref().map(|u| u.id),
                }),
            },
        )
        .await?;

        tx.commit().await?;

        // Fire-and-forget: a failed notification never unwinds the
        // committed approval.
        notifications.push(NotificationInput {
            recipient: request.requested_by,
            kind: kinds::REQUEST_APPROVED,
            title: "Request Approved".to_string(),
            message: format!(
                "Your {} request for \"{}\" has been approved",
                request.request_type, shift.title
            ),
            related_id: Some(request.id),
        });
        for notification in notifications {
            self.notify_quietly(notification).await;
        }

        self.require_request(request_id).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        request_id: Uuid,
        reason: Option<String>,
    ) -> Result<ShiftRequest, AppError> {
        let request = self.require_request(request_id).await?;
        let shift = self.require_shift(request.shift_id).await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::State(format!(
                "Cannot reject a {} request",
                request.status
            )));
        }
        authorize(actor, Action::ReviewRequest(&request))?;

        let rejection_reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "No reason provided".to_string());

        let flipped = self
            .requests
            .mark_rejected(request.id, &rejection_reason)
            .await?;
        if flipped == 0 {
            return Err(AppError::State(
                "Cannot reject a request that is no longer pending".to_string(),
            ));
        }

        self.audit
            .append(AuditInput {
                actor: actor.id,
                action: actions::REJECT_REQUEST,
                resource_type: RESOURCE_SHIFT_REQUEST,
                resource_id: request.id,
                details: serde_json::json!({ "reason": rejection_reason }),
            })
            .await?;

        self.notify_quietly(NotificationInput {
            recipient: request.requested_by,
            kind: kinds::REQUEST_REJECTED,
            title: "Request Rejected".to_string(),
            message: format!(
                "Your {} request for \"{}\" was rejected. Reason: {}",
                request.request_type, shift.title, rejection_reason
            ),
            related_id: Some(request.id),
        })
        .await;

        self.require_request(request_id).await
    }

    pub async fn cancel(&self, actor: &Actor, request_id: Uuid) -> Result<ShiftRequest, AppError> {
        let request = self.require_request(request_id).await?;

        authorize(actor, Action::CancelRequest(&request))?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::State(format!(
                "Cannot cancel a {} request",
                request.status
            )));
        }

        let flipped = self.requests.mark_cancelled(request.id).await?;
        if flipped == 0 {
            return Err(AppError::State(
                "Cannot cancel a request that is no longer pending".to_string(),
            ));
        }

        self.audit
            .append(AuditInput {
                actor: actor.id,
                action: actions::CANCEL_REQUEST,
                resource_type: RESOURCE_SHIFT_REQUEST,
                resource_id: request.id,
                details: serde_json::json!({}),
            })
            .await?;

        self.require_request(request_id).await
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: RequestQuery,
    ) -> Result<Vec<ShiftRequest>, AppError> {
        let scope = match actor.role {
            Role::Admin => RequestScope::All,
            Role::Manager => RequestScope::Approver {
                user_id: actor.id,
                department: actor.department.clone(),
            },
            Role::Employee => RequestScope::Requester(actor.id),
        };
        let requests = self.requests.list_requests(&query, scope).await?;
        Ok(requests)
    }

    /// The shift's creator reviews their own shifts; otherwise fall
    /// back to a manager in the department, admin preferred.
    async fn resolve_approver(&self, shift: &Shift) -> Result<Option<Uuid>, AppError> {
        if let Some(creator) = shift.created_by {
            return Ok(Some(creator));
        }
        let approver = self.users.find_approver(&shift.department).await?;
        Ok(approver.map(|u| u.id))
    }

    async fn require_shift(&self, id: Uuid) -> Result<Shift, AppError> {
        self.shifts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
    }

    async fn require_request(&self, id: Uuid) -> Result<ShiftRequest, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    async fn notify_quietly(&self, input: NotificationInput) {
        if let Err(e) = self.notifications.notify(input).await {
            log::warn!("Failed to write notification: {}", e);
        }
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
