use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

use shiftboard::database::models::{Role, ShiftPatch, ShiftQuery, ShiftStatus};
use shiftboard::error::AppError;

mod common;
use common::{dt, shift_input, TestContext};

#[actix_web::test]
#[serial]
async fn create_applies_store_defaults() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let detail = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Morning prep", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    assert_eq!(detail.shift.description, "");
    assert_eq!(detail.shift.department, "General");
    assert_eq!(detail.shift.required_employees, 1);
    assert_eq!(detail.shift.hourly_rate, 20.0);
    assert_eq!(detail.shift.location, "Main Office");
    assert_eq!(detail.shift.status, ShiftStatus::Published);
    assert_eq!(detail.shift.created_by, Some(manager.id));
    assert!(detail.employees.is_empty());
}

#[actix_web::test]
#[serial]
async fn employees_cannot_create_shifts() {
    let ctx = TestContext::new().await.unwrap();
    let employee = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let result = ctx
        .shift_service
        .create(
            &employee,
            shift_input("Covert shift", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await;

    assert!(matches!(result, Err(AppError::Authorization(_))));
}

#[actix_web::test]
#[serial]
async fn create_rejects_inverted_interval() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let result = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Backwards", "2024-01-01T17:00:00", "2024-01-01T09:00:00"),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[actix_web::test]
#[serial]
async fn create_with_employees_records_unconfirmed_assignments() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;
    let finn = ctx.actor("Finn", Role::Employee, "Kitchen").await;

    let mut input = shift_input("Dinner rush", "2024-01-01T17:00:00", "2024-01-01T23:00:00");
    input.employees = Some(vec![erin.id, finn.id]);

    let detail = ctx.shift_service.create(&manager, input).await.unwrap();

    assert_eq!(detail.employees.len(), 2);
    assert!(detail.employees.iter().all(|e| !e.confirmed));
    assert_eq!(detail.confirmed_count, 0);
    assert!(detail.confirmed_employees.is_empty());
}

#[actix_web::test]
#[serial]
async fn unknown_employee_in_assignment_list_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    // Create: a bad id must reject the whole call before the shift row
    // is written.
    let mut input = shift_input("Ghost crew", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    input.employees = Some(vec![Uuid::new_v4()]);
    let result = ctx.shift_service.create(&manager, input).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let listed = ctx
        .shift_service
        .query(&manager, ShiftQuery::default())
        .await
        .unwrap();
    assert!(listed.is_empty(), "no half-created shift may remain");

    // Update: a bad id leaves the existing assignment set untouched.
    let mut input = shift_input("Real crew", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    input.employees = Some(vec![erin.id]);
    let shift = ctx.shift_service.create(&manager, input).await.unwrap();

    let result = ctx
        .shift_service
        .update(
            &manager,
            shift.shift.id,
            ShiftPatch {
                employees: Some(vec![Uuid::new_v4()]),
                ..ShiftPatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let detail = ctx.shift_service.get(&manager, shift.shift.id).await.unwrap();
    assert_eq!(detail.employees.len(), 1);
    assert_eq!(detail.employees[0].id, erin.id);
}

#[actix_web::test]
#[serial]
async fn update_merges_only_supplied_fields() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let created = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Morning prep", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    let patch = ShiftPatch {
        title: Some("Late prep".to_string()),
        hourly_rate: Some(22.5),
        ..ShiftPatch::default()
    };
    let updated = ctx
        .shift_service
        .update(&manager, created.shift.id, patch)
        .await
        .unwrap();

    assert_eq!(updated.shift.title, "Late prep");
    assert_eq!(updated.shift.hourly_rate, 22.5);
    assert_eq!(updated.shift.start_time, dt("2024-01-01T09:00:00"));
    assert_eq!(updated.shift.end_time, dt("2024-01-01T17:00:00"));
}

#[actix_web::test]
#[serial]
async fn update_is_denied_for_non_creator_manager() {
    let ctx = TestContext::new().await.unwrap();
    let creator = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let other = ctx.actor("Robin", Role::Manager, "Kitchen").await;
    let admin = ctx.actor("Avery", Role::Admin, "General").await;

    let created = ctx
        .shift_service
        .create(
            &creator,
            shift_input("Morning prep", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    let patch = ShiftPatch {
        title: Some("Taken over".to_string()),
        ..ShiftPatch::default()
    };
    let denied = ctx
        .shift_service
        .update(&other, created.shift.id, patch.clone())
        .await;
    assert!(matches!(denied, Err(AppError::Authorization(_))));

    // Admins may edit anyone's shift.
    let allowed = ctx.shift_service.update(&admin, created.shift.id, patch).await;
    assert!(allowed.is_ok());
}

#[actix_web::test]
#[serial]
async fn terminal_shift_rejects_further_edits() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let created = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Morning prep", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    ctx.shift_service
        .update(
            &manager,
            created.shift.id,
            ShiftPatch {
                status: Some(ShiftStatus::Completed),
                ..ShiftPatch::default()
            },
        )
        .await
        .unwrap();

    let result = ctx
        .shift_service
        .update(
            &manager,
            created.shift.id,
            ShiftPatch {
                title: Some("Too late".to_string()),
                ..ShiftPatch::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::State(_))));
}

#[actix_web::test]
#[serial]
async fn draft_and_published_may_move_between_each_other() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let mut input = shift_input("Tentative", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    input.status = Some(ShiftStatus::Draft);
    let created = ctx.shift_service.create(&manager, input).await.unwrap();

    let published = ctx
        .shift_service
        .update(
            &manager,
            created.shift.id,
            ShiftPatch {
                status: Some(ShiftStatus::Published),
                ..ShiftPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(published.shift.status, ShiftStatus::Published);

    let back = ctx
        .shift_service
        .update(
            &manager,
            created.shift.id,
            ShiftPatch {
                status: Some(ShiftStatus::Draft),
                ..ShiftPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(back.shift.status, ShiftStatus::Draft);
}

#[actix_web::test]
#[serial]
async fn delete_removes_shift_and_assignments() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let mut input = shift_input("Doomed", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    input.employees = Some(vec![erin.id]);
    let created = ctx.shift_service.create(&manager, input).await.unwrap();

    ctx.shift_service
        .delete(&manager, created.shift.id)
        .await
        .unwrap();

    let gone = ctx.shift_service.get(&manager, created.shift.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let assignment = ctx
        .shifts
        .find_assignment(created.shift.id, erin.id)
        .await
        .unwrap();
    assert!(assignment.is_none());
}

#[actix_web::test]
#[serial]
async fn confirm_is_once_per_assignment() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;
    let finn = ctx.actor("Finn", Role::Employee, "Kitchen").await;

    let mut input = shift_input("Dinner rush", "2024-01-01T17:00:00", "2024-01-01T23:00:00");
    input.employees = Some(vec![erin.id]);
    let created = ctx.shift_service.create(&manager, input).await.unwrap();

    let confirmed = ctx
        .shift_service
        .confirm(&erin, created.shift.id)
        .await
        .unwrap();
    assert!(confirmed.confirmed);
    assert!(confirmed.confirmed_at.is_some());

    let again = ctx.shift_service.confirm(&erin, created.shift.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let outsider = ctx.shift_service.confirm(&finn, created.shift.id).await;
    assert!(matches!(outsider, Err(AppError::Authorization(_))));
}

#[actix_web::test]
#[serial]
async fn cancelled_shift_cannot_be_confirmed() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let mut input = shift_input("Dinner rush", "2024-01-01T17:00:00", "2024-01-01T23:00:00");
    input.employees = Some(vec![erin.id]);
    let created = ctx.shift_service.create(&manager, input).await.unwrap();

    ctx.shift_service
        .update(
            &manager,
            created.shift.id,
            ShiftPatch {
                status: Some(ShiftStatus::Cancelled),
                ..ShiftPatch::default()
            },
        )
        .await
        .unwrap();

    let result = ctx.shift_service.confirm(&erin, created.shift.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[actix_web::test]
#[serial]
async fn employee_listing_is_scoped_to_own_assignments() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let mut mine = shift_input("Mine", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    mine.employees = Some(vec![erin.id]);
    ctx.shift_service.create(&manager, mine).await.unwrap();
    ctx.shift_service
        .create(
            &manager,
            shift_input("Not mine", "2024-01-02T09:00:00", "2024-01-02T17:00:00"),
        )
        .await
        .unwrap();

    let as_employee = ctx
        .shift_service
        .query(&erin, ShiftQuery::default())
        .await
        .unwrap();
    assert_eq!(as_employee.len(), 1);
    assert_eq!(as_employee[0].shift.title, "Mine");

    let as_manager = ctx
        .shift_service
        .query(&manager, ShiftQuery::default())
        .await
        .unwrap();
    assert_eq!(as_manager.len(), 2);
}

#[actix_web::test]
#[serial]
async fn employee_cannot_fetch_unassigned_shift() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let created = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Private", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    let result = ctx.shift_service.get(&erin, created.shift.id).await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
}

#[actix_web::test]
#[serial]
async fn listing_filters_by_department_and_status() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let mut kitchen = shift_input("Kitchen", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    kitchen.department = Some("Kitchen".to_string());
    ctx.shift_service.create(&manager, kitchen).await.unwrap();

    let mut front = shift_input("Front", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    front.department = Some("Front of House".to_string());
    front.status = Some(ShiftStatus::Draft);
    ctx.shift_service.create(&manager, front).await.unwrap();

    let by_department = ctx
        .shift_service
        .query(
            &manager,
            ShiftQuery {
                department: Some("Kitchen".to_string()),
                ..ShiftQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_department.len(), 1);
    assert_eq!(by_department[0].shift.title, "Kitchen");

    let drafts = ctx
        .shift_service
        .query(
            &manager,
            ShiftQuery {
                status: Some(ShiftStatus::Draft),
                ..ShiftQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].shift.title, "Front");
}
