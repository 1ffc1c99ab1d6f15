use choirdinated::models::attendance;
use choirdinated::models::event::types::parse_datetime;
use choirdinated::models::event::{self, NewEvent};

mod common;
use common::{insert_active_member, setup_test_db};

fn concert(conn: &rusqlite::Connection, choir_id: i64, mode: &str) -> i64 {
    event::create(
        conn,
        choir_id,
        &NewEvent {
            title: "Vårkonsert".to_string(),
            description: String::new(),
            location: String::new(),
            start_time: parse_datetime("2026-05-10T18:00:00").unwrap(),
            end_time: parse_datetime("2026-05-10T20:00:00").unwrap(),
            event_type_id: None,
            attendance_mode: mode.to_string(),
        },
    )
    .expect("create event")
}

#[test]
fn test_seed_is_idempotent_and_defaults_to_not_responded() {
    let (_dir, conn, choir_id) = setup_test_db();
    let m1 = insert_active_member(&conn, choir_id, "kari", "2025-01-01");
    let m2 = insert_active_member(&conn, choir_id, "ola", "2025-01-01");
    let event_id = concert(&conn, choir_id, "opt_in");

    attendance::seed_event(&conn, event_id, &[m1, m2]).expect("seed");
    attendance::set_intent(&conn, event_id, m1, "attending").expect("intent");
    // Re-seeding must not reset kari's answer
    attendance::seed_event(&conn, event_id, &[m1, m2]).expect("re-seed");

    let rows = attendance::find_by_event(&conn, event_id).expect("rows");
    assert_eq!(rows.len(), 2);
    let kari = rows.iter().find(|r| r.member_id == m1).unwrap();
    assert_eq!(kari.intended_status, "attending");
    let ola = rows.iter().find(|r| r.member_id == m2).unwrap();
    assert_eq!(ola.intended_status, "not_responded");
}

#[test]
fn test_opt_out_summary_counts_silence_as_attending() {
    let (_dir, conn, choir_id) = setup_test_db();
    let event_id = concert(&conn, choir_id, "opt_out");

    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(insert_active_member(&conn, choir_id, &format!("m{i}"), "2025-01-01"));
    }
    attendance::seed_event(&conn, event_id, &ids).expect("seed");
    for id in &ids[0..3] {
        attendance::set_intent(&conn, event_id, *id, "attending").expect("intent");
    }
    for id in &ids[3..5] {
        attendance::set_intent(&conn, event_id, *id, "not_attending").expect("intent");
    }

    let found = event::find_by_id(&conn, choir_id, event_id).expect("query").expect("event");
    let summary = attendance::summarize_event(&conn, &found).expect("summary");
    assert_eq!(summary.total, 10);
    assert_eq!(summary.attending, 8);
    assert_eq!(summary.not_attending, 2);
    assert_eq!(summary.not_responded, 5);
}

#[test]
fn test_opt_in_summary_leaves_silence_uncounted() {
    let (_dir, conn, choir_id) = setup_test_db();
    let event_id = concert(&conn, choir_id, "opt_in");

    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(insert_active_member(&conn, choir_id, &format!("m{i}"), "2025-01-01"));
    }
    attendance::seed_event(&conn, event_id, &ids).expect("seed");
    for id in &ids[0..3] {
        attendance::set_intent(&conn, event_id, *id, "attending").expect("intent");
    }
    for id in &ids[3..5] {
        attendance::set_intent(&conn, event_id, *id, "not_attending").expect("intent");
    }

    let found = event::find_by_id(&conn, choir_id, event_id).expect("query").expect("event");
    let summary = attendance::summarize_event(&conn, &found).expect("summary");
    assert_eq!(summary.attending, 3);
    assert_eq!(summary.not_attending, 2);
    assert_eq!(summary.tentative, 0);
    assert_eq!(summary.not_responded, 5);
}

#[test]
fn test_recorded_actuals_tally_independently() {
    let (_dir, conn, choir_id) = setup_test_db();
    let event_id = concert(&conn, choir_id, "opt_out");
    let m1 = insert_active_member(&conn, choir_id, "kari", "2025-01-01");
    let m2 = insert_active_member(&conn, choir_id, "ola", "2025-01-01");
    let m3 = insert_active_member(&conn, choir_id, "per", "2025-01-01");

    attendance::seed_event(&conn, event_id, &[m1, m2, m3]).expect("seed");
    attendance::set_intent(&conn, event_id, m1, "attending").expect("intent");
    attendance::record_actual(&conn, event_id, m1, "present").expect("actual");
    attendance::record_actual(&conn, event_id, m2, "late").expect("actual");
    // m3 has no recorded outcome and lands in no actual bucket

    let found = event::find_by_id(&conn, choir_id, event_id).expect("query").expect("event");
    let summary = attendance::summarize_event(&conn, &found).expect("summary");
    assert_eq!(summary.present, 1);
    assert_eq!(summary.late, 1);
    assert_eq!(summary.absent, 0);
}

#[test]
fn test_recording_actual_creates_row_for_silent_member() {
    let (_dir, conn, choir_id) = setup_test_db();
    let event_id = concert(&conn, choir_id, "opt_in");
    let m1 = insert_active_member(&conn, choir_id, "kari", "2025-01-01");

    // No seed — organizer records an outcome for a member with no intent row
    attendance::record_actual(&conn, event_id, m1, "present").expect("actual");

    let rows = attendance::find_by_event(&conn, event_id).expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].intended_status, "not_responded");
    assert_eq!(rows[0].actual_status.as_deref(), Some("present"));
}

#[test]
fn test_intent_upsert_overwrites_previous_answer() {
    let (_dir, conn, choir_id) = setup_test_db();
    let event_id = concert(&conn, choir_id, "opt_in");
    let m1 = insert_active_member(&conn, choir_id, "kari", "2025-01-01");

    attendance::set_intent(&conn, event_id, m1, "tentative").expect("intent");
    attendance::set_intent(&conn, event_id, m1, "not_attending").expect("intent");

    let rows = attendance::find_by_event(&conn, event_id).expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].intended_status, "not_attending");
}
