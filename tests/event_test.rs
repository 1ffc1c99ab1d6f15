use std::collections::HashSet;

use choirdinated::models::event::recurrence::{Frequency, RecurrenceEnd, RecurrenceRule};
use choirdinated::models::event::types::parse_datetime;
use choirdinated::models::event::{self, NewEvent};

mod common;
use common::setup_test_db;

fn rehearsal(start: &str, end: &str) -> NewEvent {
    NewEvent {
        title: "Tirsdagsøvelse".to_string(),
        description: String::new(),
        location: "Aulaen".to_string(),
        start_time: parse_datetime(start).unwrap(),
        end_time: parse_datetime(end).unwrap(),
        event_type_id: None,
        attendance_mode: "opt_out".to_string(),
    }
}

fn weekly(count: u32, exclude_holidays: bool) -> RecurrenceRule {
    RecurrenceRule {
        frequency: Frequency::Weekly,
        interval: 1,
        end: RecurrenceEnd::Count(count),
        exclude_holidays,
    }
}

#[test]
fn test_create_recurring_materializes_instances() {
    let (_dir, conn, choir_id) = setup_test_db();

    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, instance_ids) =
        event::create_recurring(&conn, choir_id, &new, &weekly(4, false), &HashSet::new())
            .expect("create series");

    assert_eq!(instance_ids.len(), 4);

    // Parent carries the rule and the recurring flag
    let parent = event::find_by_id(&conn, choir_id, parent_id)
        .expect("query")
        .expect("parent");
    assert!(parent.is_recurring);
    let rule_json = parent.recurrence_rule.expect("rule stored on parent");
    let rule: RecurrenceRule = serde_json::from_str(&rule_json).expect("rule parses");
    assert_eq!(rule.end, RecurrenceEnd::Count(4));

    // Instances are independent rows back-referencing the parent, without the
    // rule or the flag
    let instances = event::find_instances(&conn, choir_id, parent_id).expect("instances");
    assert_eq!(instances.len(), 4);
    assert_eq!(instances[0].start_time, "2026-01-06T19:00:00");
    assert_eq!(instances[1].start_time, "2026-01-13T19:00:00");
    for instance in &instances {
        assert_eq!(instance.parent_event_id, Some(parent_id));
        assert!(!instance.is_recurring);
        assert!(instance.recurrence_rule.is_none());
        assert_eq!(instance.end_time.split('T').nth(1), Some("21:00:00"));
    }
}

#[test]
fn test_holiday_excluded_series_drops_slots() {
    let (_dir, conn, choir_id) = setup_test_db();

    let mut holidays = HashSet::new();
    holidays.insert("2026-01-13".parse().unwrap());

    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, instance_ids) =
        event::create_recurring(&conn, choir_id, &new, &weekly(4, true), &holidays)
            .expect("create series");

    assert_eq!(instance_ids.len(), 3);
    let instances = event::find_instances(&conn, choir_id, parent_id).expect("instances");
    let starts: Vec<&str> = instances.iter().map(|i| i.start_time.as_str()).collect();
    assert_eq!(
        starts,
        vec!["2026-01-06T19:00:00", "2026-01-20T19:00:00", "2026-01-27T19:00:00"]
    );
}

#[test]
fn test_until_before_start_creates_parent_with_no_instances() {
    let (_dir, conn, choir_id) = setup_test_db();

    let rule = RecurrenceRule {
        frequency: Frequency::Weekly,
        interval: 1,
        end: RecurrenceEnd::Until("2025-12-01".parse().unwrap()),
        exclude_holidays: false,
    };
    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, instance_ids) =
        event::create_recurring(&conn, choir_id, &new, &rule, &HashSet::new())
            .expect("create series");

    assert!(instance_ids.is_empty());
    let parent = event::find_by_id(&conn, choir_id, parent_id)
        .expect("query")
        .expect("parent still created");
    assert!(parent.is_recurring);
    assert!(event::find_instances(&conn, choir_id, parent_id)
        .expect("instances")
        .is_empty());
}

#[test]
fn test_deleting_parent_cascades_to_instances() {
    let (_dir, conn, choir_id) = setup_test_db();

    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, instance_ids) =
        event::create_recurring(&conn, choir_id, &new, &weekly(3, false), &HashSet::new())
            .expect("create series");
    assert_eq!(instance_ids.len(), 3);

    event::delete(&conn, choir_id, parent_id).expect("delete parent");

    for id in instance_ids {
        assert!(event::find_by_id(&conn, choir_id, id).expect("query").is_none());
    }
}

#[test]
fn test_upcoming_and_past_split_on_cutoff() {
    let (_dir, conn, choir_id) = setup_test_db();

    event::create(&conn, choir_id, &rehearsal("2026-03-01T19:00:00", "2026-03-01T21:00:00"))
        .expect("create");
    event::create(&conn, choir_id, &rehearsal("2026-05-01T19:00:00", "2026-05-01T21:00:00"))
        .expect("create");
    event::create(&conn, choir_id, &rehearsal("2025-11-01T19:00:00", "2025-11-01T21:00:00"))
        .expect("create");

    let cutoff = "2026-01-01T00:00:00";
    let upcoming = event::find_upcoming(&conn, choir_id, cutoff).expect("upcoming");
    assert_eq!(upcoming.len(), 2);
    // Soonest first
    assert_eq!(upcoming[0].start_time, "2026-03-01T19:00:00");

    let past = event::find_past(&conn, choir_id, cutoff).expect("past");
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].start_time, "2025-11-01T19:00:00");
}

#[test]
fn test_recurring_parents_are_kept_out_of_listings() {
    let (_dir, conn, choir_id) = setup_test_db();

    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, _) =
        event::create_recurring(&conn, choir_id, &new, &weekly(2, false), &HashSet::new())
            .expect("create series");

    let upcoming = event::find_upcoming(&conn, choir_id, "2026-01-01T00:00:00").expect("upcoming");
    assert!(upcoming.iter().all(|e| e.id != parent_id));
    assert_eq!(upcoming.len(), 2);
}

#[test]
fn test_parents_without_instances_are_reported() {
    let (_dir, conn, choir_id) = setup_test_db();

    let rule = RecurrenceRule {
        frequency: Frequency::Weekly,
        interval: 1,
        end: RecurrenceEnd::Until("2020-01-01".parse().unwrap()),
        exclude_holidays: false,
    };
    let new = rehearsal("2026-01-06T19:00:00", "2026-01-06T21:00:00");
    let (parent_id, _) = event::create_recurring(&conn, choir_id, &new, &rule, &HashSet::new())
        .expect("create series");

    let reported = event::find_parents_without_instances(&conn).expect("scan");
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].0, parent_id);
}
