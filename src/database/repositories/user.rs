use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Shift, User, UserInput, UserSummary};

/// Read-only view of the employee directory. Profile editing lives
/// outside the core; `create_user` exists for provisioning and tests.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: UserInput) -> Result<User> {
        let now = Utc::now().naive_utc();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, role, department, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING id, name, email, role, department, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.email)
        .bind(input.role)
        .bind(input.department.unwrap_or_else(|| "General".to_string()))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, department, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Pick an approver for a department: a manager in that department
    /// or any admin, admin preferred when both exist.
    pub async fn find_approver(&self, department: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, department, is_active, created_at
            FROM users
            WHERE role IN ('manager', 'admin')
              AND (department = $1 OR role = 'admin')
            ORDER BY CASE WHEN role = 'admin' THEN 0 ELSE 1 END
            LIMIT 1
            "#,
        )
        .bind(department)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Candidates eligible to cover `shift`: employees or managers who are
    /// not on the shift, hold no assignment overlapping its interval, and
    /// sit in its department or in General. Same-department names sort first.
    pub async fn find_available_replacements(&self, shift: &Shift) -> Result<Vec<UserSummary>> {
        let candidates = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.department
            FROM users u
            WHERE u.role IN ('employee', 'manager')
              AND u.id NOT IN (
                SELECT employee_id FROM shift_employees WHERE shift_id = $1
              )
              AND u.id NOT IN (
                SELECT se.employee_id
                FROM shift_employees se
                JOIN shifts s ON se.shift_id = s.id
                WHERE s.id != $2
                  AND s.start_time < $3
                  AND s.end_time > $4
              )
              AND (u.department = $5 OR u.department = 'General')
            ORDER BY
              CASE WHEN u.department = $5 THEN 0 ELSE 1 END,
              u.name ASC
            "#,
        )
        .bind(shift.id)
        .bind(shift.id)
        .bind(shift.end_time)
        .bind(shift.start_time)
        .bind(&shift.department)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    /// Check the replacement target is a real employee or manager.
    pub async fn find_assignable(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, department, is_active, created_at
            FROM users
            WHERE id = $1 AND role IN ('employee', 'manager')
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
