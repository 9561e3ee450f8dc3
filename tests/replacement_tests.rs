use pretty_assertions::assert_eq;
use serial_test::serial;
use uuid::Uuid;

use shiftboard::database::models::Role;
use shiftboard::error::AppError;

mod common;
use common::{shift_input, TestContext};

#[actix_web::test]
#[serial]
async fn replacements_exclude_assigned_overlapping_and_foreign_departments() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let alice = ctx.actor("Alice", Role::Employee, "Kitchen").await;
    let bob = ctx.actor("Bob", Role::Employee, "Kitchen").await;
    let carol = ctx.actor("Carol", Role::Employee, "Kitchen").await;
    let dave = ctx.actor("Dave", Role::Employee, "Front of House").await;
    let gwen = ctx.actor("Gwen", Role::Employee, "General").await;

    // Target shift, Alice already on it.
    let mut target = shift_input("Target", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    target.department = Some("Kitchen".to_string());
    target.employees = Some(vec![alice.id]);
    let target = ctx.shift_service.create(&manager, target).await.unwrap();

    // Carol is busy with a partially overlapping shift.
    let mut busy = shift_input("Overlap", "2024-01-01T15:00:00", "2024-01-01T20:00:00");
    busy.employees = Some(vec![carol.id]);
    ctx.shift_service.create(&manager, busy).await.unwrap();

    let candidates = ctx
        .replacement_service
        .available_replacements(&manager, target.shift.id)
        .await
        .unwrap();
    let ids: Vec<Uuid> = candidates.iter().map(|c| c.id).collect();

    assert!(ids.contains(&bob.id), "free same-department employee");
    assert!(ids.contains(&gwen.id), "General acts as a floating pool");
    assert!(!ids.contains(&alice.id), "already on the shift");
    assert!(!ids.contains(&carol.id), "overlapping assignment");
    assert!(!ids.contains(&dave.id), "different department");

    // Same-department candidates sort ahead of the General pool.
    let bob_pos = ids.iter().position(|id| *id == bob.id).unwrap();
    let gwen_pos = ids.iter().position(|id| *id == gwen.id).unwrap();
    assert!(bob_pos < gwen_pos);
}

#[actix_web::test]
#[serial]
async fn adjacent_shift_does_not_disqualify() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let bob = ctx.actor("Bob", Role::Employee, "Kitchen").await;

    let mut target = shift_input("Target", "2024-01-01T09:00:00", "2024-01-01T17:00:00");
    target.department = Some("Kitchen".to_string());
    let target = ctx.shift_service.create(&manager, target).await.unwrap();

    // Back-to-back: ends exactly when the target starts.
    let mut earlier = shift_input("Earlier", "2024-01-01T05:00:00", "2024-01-01T09:00:00");
    earlier.employees = Some(vec![bob.id]);
    ctx.shift_service.create(&manager, earlier).await.unwrap();

    let candidates = ctx
        .replacement_service
        .available_replacements(&manager, target.shift.id)
        .await
        .unwrap();
    assert!(candidates.iter().any(|c| c.id == bob.id));
}

#[actix_web::test]
#[serial]
async fn employees_cannot_list_replacements() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;
    let erin = ctx.actor("Erin", Role::Employee, "Kitchen").await;

    let shift = ctx
        .shift_service
        .create(
            &manager,
            shift_input("Target", "2024-01-01T09:00:00", "2024-01-01T17:00:00"),
        )
        .await
        .unwrap();

    let result = ctx
        .replacement_service
        .available_replacements(&erin, shift.shift.id)
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
}

#[actix_web::test]
#[serial]
async fn unknown_shift_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.actor("Morgan", Role::Manager, "Kitchen").await;

    let result = ctx
        .replacement_service
        .available_replacements(&manager, Uuid::new_v4())
        .await;
    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Shift not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}
