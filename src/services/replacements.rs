use uuid::Uuid;

use crate::database::models::UserSummary;
use crate::database::repositories::{ShiftRepository, UserRepository};
use crate::error::AppError;
use crate::services::authorization::{authorize, Action, Actor};

/// Computes eligible substitutes for a shift. Fixed heuristic: same
/// department (or General), free of overlapping assignments; it does
/// not try to balance cost or fairness.
#[derive(Clone)]
pub struct ReplacementService {
    shifts: ShiftRepository,
    users: UserRepository,
}

impl ReplacementService {
    pub fn new(shifts: ShiftRepository, users: UserRepository) -> Self {
        Self { shifts, users }
    }

    pub async fn available_replacements(
        &self,
        actor: &Actor,
        shift_id: Uuid,
    ) -> Result<Vec<UserSummary>, AppError> {
        authorize(actor, Action::ListReplacements)?;

        let shift = self
            .shifts
            .find_by_id(shift_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        let candidates = self.users.find_available_replacements(&shift).await?;
        Ok(candidates)
    }
}
