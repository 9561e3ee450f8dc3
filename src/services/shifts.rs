use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::database::models::{
    Shift, ShiftAssignment, ShiftDetail, ShiftInput, ShiftPatch, ShiftQuery, ShiftStatus,
};
use crate::database::repositories::{ShiftRepository, UserRepository};
use crate::error::AppError;
use crate::services::authorization::{authorize, Action, Actor};
use crate::services::week::{self, WeekView};

/// The shift store: shift lifecycle, assignments, confirmation and the
/// calendar-week projection.
#[derive(Clone)]
pub struct ShiftService {
    shifts: ShiftRepository,
    users: UserRepository,
}

impl ShiftService {
    pub fn new(shifts: ShiftRepository, users: UserRepository) -> Self {
        Self { shifts, users }
    }

    pub async fn create(&self, actor: &Actor, input: ShiftInput) -> Result<ShiftDetail, AppError> {
        authorize(actor, Action::CreateShift)?;
        validate_times(input.start_time, input.end_time)?;
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if input.required_employees.is_some_and(|n| n < 1) {
            return Err(AppError::Validation(
                "At least one required employee".to_string(),
            ));
        }
        if input.hourly_rate.is_some_and(|r| r < 0.0) {
            return Err(AppError::Validation(
                "Hourly rate cannot be negative".to_string(),
            ));
        }

        if let Some(ref employees) = input.employees {
            self.ensure_assignable(employees).await?;
        }

        let shift = self.shifts.create_shift(&input, actor.id).await?;
        if let Some(ref employees) = input.employees {
            self.shifts.insert_assignments(shift.id, employees).await?;
        }

        log::info!("Shift {} created by {}", shift.id, actor.id);
        self.detail(shift).await
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<ShiftDetail, AppError> {
        let shift = self.require_shift(id).await?;
        if actor.is_employee() {
            let assignment = self.shifts.find_assignment(id, actor.id).await?;
            if assignment.is_none() {
                return Err(AppError::Authorization(
                    "You are not assigned to this shift".to_string(),
                ));
            }
        }
        self.detail(shift).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ShiftPatch,
    ) -> Result<ShiftDetail, AppError> {
        let shift = self.require_shift(id).await?;
        authorize(actor, Action::ManageShift(&shift))?;

        if shift.status.is_terminal() {
            return Err(AppError::State(format!(
                "Cannot edit a {} shift",
                shift.status
            )));
        }
        if let Some(next) = patch.status {
            if !shift.status.can_transition_to(next) {
                return Err(AppError::State(format!(
                    "Cannot move a {} shift to {}",
                    shift.status, next
                )));
            }
        }
        if patch.required_employees.is_some_and(|n| n < 1) {
            return Err(AppError::Validation(
                "At least one required employee".to_string(),
            ));
        }
        if patch.hourly_rate.is_some_and(|r| r < 0.0) {
            return Err(AppError::Validation(
                "Hourly rate cannot be negative".to_string(),
            ));
        }
        // Re-validate the interval with unsupplied ends taken from the store.
        let start = patch.start_time.unwrap_or(shift.start_time);
        let end = patch.end_time.unwrap_or(shift.end_time);
        validate_times(start, end)?;

        if let Some(ref employees) = patch.employees {
            self.ensure_assignable(employees).await?;
        }

        let updated = self
            .shifts
            .update_shift(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        if let Some(ref employees) = patch.employees {
            self.shifts.replace_assignments(id, employees).await?;
        }

        self.detail(updated).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let shift = self.require_shift(id).await?;
        authorize(actor, Action::ManageShift(&shift))?;

        self.shifts.delete_shift(id).await?;
        log::info!("Shift {} deleted by {}", id, actor.id);
        Ok(())
    }

    /// Confirm the actor's attendance on a shift, once.
    pub async fn confirm(&self, actor: &Actor, shift_id: Uuid) -> Result<ShiftAssignment, AppError> {
        let assignment = self
            .shifts
            .find_assignment(shift_id, actor.id)
            .await?
            .ok_or_else(|| {
                AppError::Authorization("You are not assigned to this shift".to_string())
            })?;

        let shift = self.require_shift(shift_id).await?;
        if shift.status == ShiftStatus::Cancelled {
            return Err(AppError::Conflict(
                "Cannot confirm a cancelled shift".to_string(),
            ));
        }
        if assignment.confirmed {
            return Err(AppError::Conflict(
                "Already confirmed for this shift".to_string(),
            ));
        }

        let confirmed = self
            .shifts
            .confirm_assignment(shift_id, actor.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        Ok(confirmed)
    }

    /// Role-scoped listing: employees see only shifts they are assigned
    /// to, managers and admins see everything matching the filters.
    pub async fn query(&self, actor: &Actor, query: ShiftQuery) -> Result<Vec<ShiftDetail>, AppError> {
        let visible_to = actor.is_employee().then_some(actor.id);
        let shifts = self.shifts.query_shifts(&query, visible_to).await?;

        let mut details = Vec::with_capacity(shifts.len());
        for shift in shifts {
            details.push(self.detail(shift).await?);
        }
        Ok(details)
    }

    /// Monday..Friday projection of the week containing `date`. The
    /// window is half-open: anything up to but excluding Saturday
    /// midnight counts as Friday.
    pub async fn week_view(&self, actor: &Actor, date: NaiveDate) -> Result<WeekView, AppError> {
        let monday = week::week_monday(date);
        let query = ShiftQuery {
            start_date: monday.and_hms_opt(0, 0, 0),
            end_date: (monday + Days::new(5)).and_hms_opt(0, 0, 0),
            ..ShiftQuery::default()
        };
        let details = self.query(actor, query).await?;
        Ok(week::build_week(monday, details))
    }

    /// Every id in an assignment list must resolve in the directory
    /// before any shift row is written.
    async fn ensure_assignable(&self, employees: &[Uuid]) -> Result<(), AppError> {
        for employee_id in employees {
            if self.users.find_assignable(*employee_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Employee {} not found",
                    employee_id
                )));
            }
        }
        Ok(())
    }

    async fn require_shift(&self, id: Uuid) -> Result<Shift, AppError> {
        self.shifts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
    }

    async fn detail(&self, shift: Shift) -> Result<ShiftDetail, AppError> {
        let employees = self.shifts.employees_for_shift(shift.id).await?;
        Ok(ShiftDetail::new(shift, employees))
    }
}

fn validate_times(
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::Validation(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}
