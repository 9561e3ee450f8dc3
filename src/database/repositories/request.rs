use anyhow::Result;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::database::models::{RequestQuery, ShiftRequest, ShiftRequestInput};

const REQUEST_COLUMNS: &str = "id, shift_id, request_type, status, reason, requested_by, \
     assigned_to, replacement_employee_id, proposed_start_time, proposed_end_time, \
     rejection_reason, created_at, updated_at";

/// Who a request listing is scoped to.
pub enum RequestScope {
    All,
    Requester(Uuid),
    Approver { user_id: Uuid, department: String },
}

#[derive(Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_request(
        &self,
        input: &ShiftRequestInput,
        requested_by: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<ShiftRequest> {
        let now = Utc::now().naive_utc();
        let request = sqlx::query_as::<_, ShiftRequest>(
            r#"
            INSERT INTO shift_requests (
                id, shift_id, request_type, status, reason, requested_by, assigned_to,
                proposed_start_time, proposed_end_time, created_at, updated_at
            )
            VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, shift_id, request_type, status, reason, requested_by,
                      assigned_to, replacement_employee_id, proposed_start_time,
                      proposed_end_time, rejection_reason, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.shift_id)
        .bind(input.request_type)
        .bind(input.reason.clone().unwrap_or_default())
        .bind(requested_by)
        .bind(assigned_to)
        .bind(input.proposed_start_time)
        .bind(input.proposed_end_time)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShiftRequest>> {
        let request = sqlx::query_as::<_, ShiftRequest>(&format!(
            "SELECT {} FROM shift_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn has_pending(&self, shift_id: Uuid, requested_by: Uuid) -> Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM shift_requests
            WHERE shift_id = $1 AND requested_by = $2 AND status = 'pending'
            "#,
        )
        .bind(shift_id)
        .bind(requested_by)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn list_requests(
        &self,
        query: &RequestQuery,
        scope: RequestScope,
    ) -> Result<Vec<ShiftRequest>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM shift_requests WHERE 1=1",
            REQUEST_COLUMNS
        ));

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(request_type) = query.request_type {
            builder.push(" AND request_type = ").push_bind(request_type);
        }
        if let Some(user_id) = query.user_id {
            builder
                .push(" AND (requested_by = ")
                .push_bind(user_id)
                .push(" OR assigned_to = ")
                .push_bind(user_id)
                .push(")");
        }

        match scope {
            RequestScope::All => {}
            RequestScope::Requester(user_id) => {
                builder.push(" AND requested_by = ").push_bind(user_id);
            }
            RequestScope::Approver {
                user_id,
                department,
            } => {
                builder
                    .push(" AND (assigned_to = ")
                    .push_bind(user_id)
                    .push(" OR requested_by IN (SELECT id FROM users WHERE department = ")
                    .push_bind(department)
                    .push("))");
            }
        }

        builder.push(" ORDER BY created_at DESC");

        let requests = builder
            .build_query_as::<ShiftRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Conditional transition from pending to approved, recording the
    /// replacement for swap requests. Zero affected rows means a
    /// concurrent writer got there first.
    pub async fn approve_tx(
        conn: &mut SqliteConnection,
        id: Uuid,
        replacement_employee_id: Option<Uuid>,
    ) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            UPDATE shift_requests
            SET status = 'approved',
                replacement_employee_id = COALESCE($1, replacement_employee_id),
                updated_at = $2
            WHERE id = $3 AND status = 'pending'
            "#,
        )
        .bind(replacement_employee_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn mark_rejected(&self, id: Uuid, rejection_reason: &str) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            UPDATE shift_requests
            SET status = 'rejected', rejection_reason = $1, updated_at = $2
            WHERE id = $3 AND status = 'pending'
            "#,
        )
        .bind(rejection_reason)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn mark_cancelled(&self, id: Uuid) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            UPDATE shift_requests
            SET status = 'cancelled', updated_at = $1
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
