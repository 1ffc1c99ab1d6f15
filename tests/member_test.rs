use chrono::Utc;

use choirdinated::models::{member, membership};

mod common;
use common::{insert_active_member, insert_user, setup_test_db};

#[test]
fn test_active_status_comes_from_open_period() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2025-08-01");

    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member not found");
    assert_eq!(display.status, "active");
    assert_eq!(display.active_since, "2025-08-01");
}

#[test]
fn test_member_without_period_is_inactive() {
    let (_dir, conn, choir_id) = setup_test_db();
    let user_id = insert_user(&conn, "ola");
    let member_id = member::create(
        &conn,
        choir_id,
        &member::NewMember {
            user_id,
            role: "member".to_string(),
            membership_type_id: None,
            voice_group_id: None,
            voice_type_id: None,
        },
    )
    .expect("create member");

    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member not found");
    assert_eq!(display.status, "inactive");
    assert_eq!(display.active_since, "");
}

#[test]
fn test_closing_period_deactivates_member() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2025-08-01");

    let closed = membership::close_open_period(
        &conn,
        member_id,
        "2026-06-30".parse().unwrap(),
        "moved away",
    )
    .expect("close");
    assert!(closed);

    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member not found");
    assert_eq!(display.status, "inactive");

    // Closing again is a no-op
    let closed_again =
        membership::close_open_period(&conn, member_id, "2026-07-01".parse().unwrap(), "")
            .expect("close again");
    assert!(!closed_again);
}

#[test]
fn test_reactivation_opens_second_period() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2024-01-01");

    membership::close_open_period(&conn, member_id, "2024-12-31".parse().unwrap(), "pause")
        .expect("close");
    membership::open_period(&conn, member_id, "2026-01-01".parse().unwrap()).expect("reopen");

    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member not found");
    assert_eq!(display.status, "active");
    assert_eq!(display.active_since, "2026-01-01");

    let periods = membership::find_periods(&conn, member_id).expect("periods");
    assert_eq!(periods.len(), 2);
}

#[test]
fn test_approved_current_leave_shows_on_leave() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2025-01-01");

    let today = Utc::now().date_naive();
    let leave_id = membership::request_leave(
        &conn,
        member_id,
        today - chrono::Duration::days(7),
        today + chrono::Duration::days(7),
        "parental leave",
    )
    .expect("request leave");

    // Pending leave does not affect status
    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member");
    assert_eq!(display.status, "active");

    membership::set_leave_status(&conn, leave_id, "approved").expect("approve");
    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member");
    assert_eq!(display.status, "on_leave");

    assert!(membership::is_on_leave(&conn, member_id, today).expect("is_on_leave"));
}

#[test]
fn test_expired_leave_does_not_suppress_active() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2025-01-01");

    let leave_id = membership::request_leave(
        &conn,
        member_id,
        "2025-01-01".parse().unwrap(),
        "2025-02-01".parse().unwrap(),
        "old leave",
    )
    .expect("request leave");
    membership::set_leave_status(&conn, leave_id, "approved").expect("approve");

    let display = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member");
    assert_eq!(display.status, "active");
}

#[test]
fn test_membership_resolution_is_scoped_to_user() {
    let (_dir, conn, choir_id) = setup_test_db();
    let member_id = insert_active_member(&conn, choir_id, "kari", "2025-01-01");

    let kari = member::find_by_id(&conn, choir_id, member_id)
        .expect("query")
        .expect("member");
    let membership_row = member::find_membership(&conn, kari.user_id, None)
        .expect("query")
        .expect("membership");
    assert_eq!(membership_row.id, member_id);
    assert_eq!(membership_row.choir_id, choir_id);

    // Unknown user resolves to no membership
    assert!(member::find_membership(&conn, 999_999, None).expect("query").is_none());

    // Wrong choir filter resolves to no membership
    assert!(
        member::find_membership(&conn, kari.user_id, Some(choir_id + 1))
            .expect("query")
            .is_none()
    );
}

#[test]
fn test_pagination_counts_and_pages() {
    let (_dir, conn, choir_id) = setup_test_db();
    for i in 0..5 {
        insert_active_member(&conn, choir_id, &format!("sanger{i}"), "2025-01-01");
    }

    let page1 = member::find_paginated(&conn, choir_id, 1, 2).expect("paginate");
    assert_eq!(page1.total_count, 5);
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.members.len(), 2);

    let page3 = member::find_paginated(&conn, choir_id, 3, 2).expect("paginate");
    assert_eq!(page3.members.len(), 1);
}

#[test]
fn test_active_ids_excludes_ended_members() {
    let (_dir, conn, choir_id) = setup_test_db();
    let active = insert_active_member(&conn, choir_id, "aktiv", "2025-01-01");
    let ended = insert_active_member(&conn, choir_id, "sluttet", "2025-01-01");
    membership::close_open_period(&conn, ended, "2025-06-30".parse().unwrap(), "quit")
        .expect("close");

    let ids = member::find_active_ids(&conn, choir_id).expect("active ids");
    assert_eq!(ids, vec![active]);
}
