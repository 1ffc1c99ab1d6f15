use rusqlite::{Connection, params};
use std::collections::HashSet;

use super::recurrence::{self, RecurrenceRule};
use super::types::{Event, NewEvent, format_datetime};

const SELECT_EVENT: &str = "\
    SELECT e.id, e.choir_id, e.title, e.description, e.location, \
           e.start_time, e.end_time, \
           e.event_type_id, COALESCE(et.display_name, '') AS event_type, \
           e.attendance_mode, e.is_recurring, e.recurrence_rule, e.parent_event_id, \
           e.created_at, e.updated_at \
    FROM events e \
    LEFT JOIN list_of_values et ON et.id = e.event_type_id \
    WHERE e.choir_id = ?1";

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        choir_id: row.get("choir_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        location: row.get("location")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        event_type_id: row.get("event_type_id")?,
        event_type: row.get("event_type")?,
        attendance_mode: row.get("attendance_mode")?,
        is_recurring: row.get("is_recurring")?,
        recurrence_rule: row.get("recurrence_rule")?,
        parent_event_id: row.get("parent_event_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Create a standalone event.
pub fn create(conn: &Connection, choir_id: i64, new: &NewEvent) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO events (choir_id, title, description, location, start_time, end_time, \
                             event_type_id, attendance_mode) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            choir_id,
            new.title,
            new.description,
            new.location,
            format_datetime(new.start_time),
            format_datetime(new.end_time),
            new.event_type_id,
            new.attendance_mode
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Create a recurring series: the parent row first (carrying the serialized
/// rule), then one independent row per expanded occurrence, each patched with
/// parent_event_id after its insert.
///
/// The sequence is intentionally not wrapped in a transaction; a failure
/// partway through leaves a parent with a partial set of instances, which the
/// maintenance tooling reports rather than this path rolling back.
///
/// Returns (parent_id, instance_ids). An empty schedule (e.g. `until` before
/// the start) still creates the parent.
pub fn create_recurring(
    conn: &Connection,
    choir_id: i64,
    new: &NewEvent,
    rule: &RecurrenceRule,
    holidays: &HashSet<chrono::NaiveDate>,
) -> rusqlite::Result<(i64, Vec<i64>)> {
    let rule_json = serde_json::to_string(rule).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(e))
    })?;

    conn.execute(
        "INSERT INTO events (choir_id, title, description, location, start_time, end_time, \
                             event_type_id, attendance_mode, is_recurring, recurrence_rule) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
        params![
            choir_id,
            new.title,
            new.description,
            new.location,
            format_datetime(new.start_time),
            format_datetime(new.end_time),
            new.event_type_id,
            new.attendance_mode,
            rule_json
        ],
    )?;
    let parent_id = conn.last_insert_rowid();

    let occurrences = recurrence::expand(rule, new.start_time, new.end_time, holidays);
    let mut instance_ids = Vec::with_capacity(occurrences.len());
    for occ in &occurrences {
        conn.execute(
            "INSERT INTO events (choir_id, title, description, location, start_time, end_time, \
                                 event_type_id, attendance_mode) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                choir_id,
                new.title,
                new.description,
                new.location,
                format_datetime(occ.start),
                format_datetime(occ.end),
                new.event_type_id,
                new.attendance_mode
            ],
        )?;
        let instance_id = conn.last_insert_rowid();
        conn.execute(
            "UPDATE events SET parent_event_id = ?1 WHERE id = ?2",
            params![parent_id, instance_id],
        )?;
        instance_ids.push(instance_id);
    }

    Ok((parent_id, instance_ids))
}

pub fn find_by_id(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<Option<Event>> {
    let sql = format!("{SELECT_EVENT} AND e.id = ?2");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![choir_id, id], row_to_event)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Upcoming events from a cutoff, soonest first. Recurring parents are
/// excluded — their instances are the schedulable rows.
pub fn find_upcoming(
    conn: &Connection,
    choir_id: i64,
    from: &str,
) -> rusqlite::Result<Vec<Event>> {
    let sql = format!(
        "{SELECT_EVENT} AND e.start_time >= ?2 AND e.is_recurring = 0 ORDER BY e.start_time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![choir_id, from], row_to_event)?;
    rows.collect()
}

/// Past events before a cutoff, most recent first.
pub fn find_past(conn: &Connection, choir_id: i64, before: &str) -> rusqlite::Result<Vec<Event>> {
    let sql = format!(
        "{SELECT_EVENT} AND e.start_time < ?2 AND e.is_recurring = 0 ORDER BY e.start_time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![choir_id, before], row_to_event)?;
    rows.collect()
}

pub fn find_instances(conn: &Connection, choir_id: i64, parent_id: i64) -> rusqlite::Result<Vec<Event>> {
    let sql = format!("{SELECT_EVENT} AND e.parent_event_id = ?2 ORDER BY e.start_time ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![choir_id, parent_id], row_to_event)?;
    rows.collect()
}

/// Update a single event row. Instances are independent; updating a parent's
/// fields or rule never touches instances that already exist.
pub fn update(conn: &Connection, choir_id: i64, id: i64, new: &NewEvent) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE events SET title = ?1, description = ?2, location = ?3, start_time = ?4, \
         end_time = ?5, event_type_id = ?6, attendance_mode = ?7, updated_at = datetime('now') \
         WHERE id = ?8 AND choir_id = ?9",
        params![
            new.title,
            new.description,
            new.location,
            format_datetime(new.start_time),
            format_datetime(new.end_time),
            new.event_type_id,
            new.attendance_mode,
            id,
            choir_id
        ],
    )?;
    Ok(())
}

/// Delete an event. Deleting a recurring parent cascades to its instances via
/// the parent_event_id foreign key.
pub fn delete(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM events WHERE id = ?1 AND choir_id = ?2",
        params![id, choir_id],
    )?;
    Ok(())
}

/// Recurring parents whose instance set is empty. A parent created with an
/// exhausted rule is legitimate; one left behind by a partial failure is what
/// the maintenance script is after — both are listed for the operator.
pub fn find_parents_without_instances(conn: &Connection) -> rusqlite::Result<Vec<(i64, i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.choir_id, e.title FROM events e \
         WHERE e.is_recurring = 1 \
           AND NOT EXISTS (SELECT 1 FROM events i WHERE i.parent_event_id = e.id) \
         ORDER BY e.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;
    rows.collect()
}
