use anyhow::Result;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::database::models::AuditInput;

/// Append-only audit sink. No read path.
#[derive(Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, input: AuditInput) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Self::append_tx(&mut conn, input).await
    }

    /// Variant used inside the approval transaction so the audit entry
    /// commits or rolls back with the rest of the step.
    pub async fn append_tx(conn: &mut SqliteConnection, input: AuditInput) -> Result<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, resource_type, resource_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.actor)
        .bind(input.action)
        .bind(input.resource_type)
        .bind(input.resource_id)
        .bind(input.details.to_string())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
