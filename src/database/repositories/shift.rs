use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::database::models::{
    AssignedEmployee, Shift, ShiftAssignment, ShiftInput, ShiftPatch, ShiftQuery, ShiftStatus,
};

const SHIFT_COLUMNS: &str = "id, title, description, start_time, end_time, department, \
     required_employees, hourly_rate, location, status, created_by, created_at";

#[derive(Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_shift(&self, input: &ShiftInput, created_by: Uuid) -> Result<Shift> {
        let now = Utc::now().naive_utc();
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            INSERT INTO shifts (
                id, title, description, start_time, end_time, department,
                required_employees, hourly_rate, location, status, created_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, title, description, start_time, end_time, department,
                      required_employees, hourly_rate, location, status, created_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(input.description.clone().unwrap_or_default())
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.department.clone().unwrap_or_else(|| "General".to_string()))
        .bind(input.required_employees.unwrap_or(1))
        .bind(input.hourly_rate.unwrap_or(20.0))
        .bind(input.location.clone().unwrap_or_else(|| "Main Office".to_string()))
        .bind(input.status.unwrap_or_default())
        .bind(created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(shift)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {} FROM shifts WHERE id = $1",
            SHIFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Date-range/department/status filters, plus the employee scoping
    /// subquery when `visible_to` is set. Filters on the start instant;
    /// the date range is half-open, `start_date <= start_time < end_date`.
    pub async fn query_shifts(
        &self,
        query: &ShiftQuery,
        visible_to: Option<Uuid>,
    ) -> Result<Vec<Shift>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM shifts WHERE 1=1",
            SHIFT_COLUMNS
        ));

        if let Some(start) = query.start_date {
            builder.push(" AND start_time >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            builder.push(" AND start_time < ").push_bind(end);
        }
        if let Some(ref department) = query.department {
            builder.push(" AND department = ").push_bind(department.clone());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(employee_id) = visible_to {
            builder
                .push(" AND id IN (SELECT shift_id FROM shift_employees WHERE employee_id = ")
                .push_bind(employee_id)
                .push(")");
        }
        builder.push(" ORDER BY start_time ASC");

        let shifts = builder
            .build_query_as::<Shift>()
            .fetch_all(&self.pool)
            .await?;

        Ok(shifts)
    }

    /// Merge-update: unsupplied fields keep their stored values.
    pub async fn update_shift(&self, id: Uuid, patch: &ShiftPatch) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                department = COALESCE($5, department),
                required_employees = COALESCE($6, required_employees),
                hourly_rate = COALESCE($7, hourly_rate),
                location = COALESCE($8, location),
                status = COALESCE($9, status)
            WHERE id = $10
            RETURNING id, title, description, start_time, end_time, department,
                      required_employees, hourly_rate, location, status, created_by, created_at
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.start_time)
        .bind(patch.end_time)
        .bind(&patch.department)
        .bind(patch.required_employees)
        .bind(patch.hourly_rate)
        .bind(&patch.location)
        .bind(patch.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Removes the shift together with its assignments and requests.
    pub async fn delete_shift(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shift_employees WHERE shift_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM shift_requests WHERE shift_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // Assignment queries

    pub async fn employees_for_shift(&self, shift_id: Uuid) -> Result<Vec<AssignedEmployee>> {
        let employees = sqlx::query_as::<_, AssignedEmployee>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.department, se.confirmed
            FROM shift_employees se
            JOIN users u ON se.employee_id = u.id
            WHERE se.shift_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn find_assignment(
        &self,
        shift_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<ShiftAssignment>> {
        let assignment = sqlx::query_as::<_, ShiftAssignment>(
            r#"
            SELECT id, shift_id, employee_id, confirmed, confirmed_at, created_at
            FROM shift_employees
            WHERE shift_id = $1 AND employee_id = $2
            "#,
        )
        .bind(shift_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn insert_assignments(&self, shift_id: Uuid, employees: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for employee_id in employees {
            Self::insert_assignment_tx(&mut tx, shift_id, *employee_id).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Bulk-replace: drops every assignment on the shift, then inserts
    /// the new set unconfirmed, all in one transaction.
    pub async fn replace_assignments(&self, shift_id: Uuid, employees: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shift_employees WHERE shift_id = $1")
            .bind(shift_id)
            .execute(&mut *tx)
            .await?;
        for employee_id in employees {
            Self::insert_assignment_tx(&mut tx, shift_id, *employee_id).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn confirm_assignment(
        &self,
        shift_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<ShiftAssignment>> {
        let now = Utc::now().naive_utc();
        let assignment = sqlx::query_as::<_, ShiftAssignment>(
            r#"
            UPDATE shift_employees
            SET confirmed = TRUE, confirmed_at = $1
            WHERE shift_id = $2 AND employee_id = $3
            RETURNING id, shift_id, employee_id, confirmed, confirmed_at, created_at
            "#,
        )
        .bind(now)
        .bind(shift_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    // Transaction-participating variants, used by the approval path.

    pub async fn insert_assignment_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
        employee_id: Uuid,
    ) -> Result<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO shift_employees (id, shift_id, employee_id, confirmed, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            ON CONFLICT (shift_id, employee_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shift_id)
        .bind(employee_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn remove_assignment_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM shift_employees WHERE shift_id = $1 AND employee_id = $2",
        )
        .bind(shift_id)
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn assignment_exists_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM shift_employees WHERE shift_id = $1 AND employee_id = $2",
        )
        .bind(shift_id)
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.is_some())
    }

    /// Title of some other shift whose interval overlaps
    /// `[start_time, end_time)` for this employee, if one exists.
    pub async fn overlap_conflict_tx(
        conn: &mut SqliteConnection,
        employee_id: Uuid,
        exclude_shift: Uuid,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT s.title
            FROM shift_employees se
            JOIN shifts s ON se.shift_id = s.id
            WHERE se.employee_id = $1
              AND s.id != $2
              AND s.start_time < $3
              AND s.end_time > $4
            "#,
        )
        .bind(employee_id)
        .bind(exclude_shift)
        .bind(end_time)
        .bind(start_time)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|(title,)| title))
    }

    pub async fn assigned_employee_ids_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
    ) -> Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT employee_id FROM shift_employees WHERE shift_id = $1")
                .bind(shift_id)
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn set_times_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<()> {
        sqlx::query("UPDATE shifts SET start_time = $1, end_time = $2 WHERE id = $3")
            .bind(start_time)
            .bind(end_time)
            .bind(shift_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn set_status_tx(
        conn: &mut SqliteConnection,
        shift_id: Uuid,
        status: ShiftStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE shifts SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(shift_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
