#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tempfile::TempDir;

use shiftboard::database::init_database;
use shiftboard::database::models::{Role, ShiftInput, UserInput};
use shiftboard::database::repositories::{
    AuditRepository, NotificationRepository, RequestRepository, ShiftRepository, UserRepository,
};
use shiftboard::services::{Actor, ReplacementService, RequestService, ShiftService};

/// Fresh file-backed database plus the full service stack. The temp
/// directory must outlive the pool, hence the held handle.
pub struct TestContext {
    pub pool: SqlitePool,
    pub users: UserRepository,
    pub shifts: ShiftRepository,
    pub requests: RequestRepository,
    pub notifications: NotificationRepository,
    pub shift_service: ShiftService,
    pub replacement_service: ReplacementService,
    pub request_service: RequestService,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        let users = UserRepository::new(pool.clone());
        let shifts = ShiftRepository::new(pool.clone());
        let requests = RequestRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool.clone());
        let audit = AuditRepository::new(pool.clone());

        let shift_service = ShiftService::new(shifts.clone(), users.clone());
        let replacement_service = ReplacementService::new(shifts.clone(), users.clone());
        let request_service = RequestService::new(
            pool.clone(),
            requests.clone(),
            shifts.clone(),
            users.clone(),
            notifications.clone(),
            audit,
        );

        Ok(Self {
            pool,
            users,
            shifts,
            requests,
            notifications,
            shift_service,
            replacement_service,
            request_service,
            _temp_dir: temp_dir,
        })
    }

    pub async fn actor(&self, name: &str, role: Role, department: &str) -> Actor {
        let user = self
            .users
            .create_user(UserInput {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                role,
                department: Some(department.to_string()),
            })
            .await
            .expect("failed to create test user");
        Actor::from(user)
    }
}

pub fn dt(s: &str) -> NaiveDateTime {
    s.parse().expect("bad test datetime")
}

pub fn shift_input(title: &str, start: &str, end: &str) -> ShiftInput {
    ShiftInput {
        title: title.to_string(),
        description: None,
        start_time: dt(start),
        end_time: dt(end),
        department: None,
        required_employees: None,
        hourly_rate: None,
        location: None,
        status: None,
        employees: None,
    }
}
