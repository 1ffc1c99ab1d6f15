use rusqlite::{Connection, params};

use super::types::{AttendanceRow, AttendanceSummary, summarize};
use crate::models::event::Event;

const SELECT_ATTENDANCE: &str = "\
    SELECT a.id, a.event_id, a.member_id, \
           COALESCE(u.display_name, u.username) AS member_name, \
           a.intended_status, a.actual_status, a.updated_at \
    FROM event_attendance a \
    JOIN members m ON m.id = a.member_id \
    JOIN users u ON u.id = m.user_id \
    WHERE a.event_id = ?1";

fn row_to_attendance(row: &rusqlite::Row) -> rusqlite::Result<AttendanceRow> {
    Ok(AttendanceRow {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        member_id: row.get("member_id")?,
        member_name: row.get("member_name")?,
        intended_status: row.get("intended_status")?,
        actual_status: row.get("actual_status")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Materialize not_responded rows for the given members. Idempotent; existing
/// rows keep their statuses.
pub fn seed_event(conn: &Connection, event_id: i64, member_ids: &[i64]) -> rusqlite::Result<()> {
    for member_id in member_ids {
        conn.execute(
            "INSERT OR IGNORE INTO event_attendance (event_id, member_id) VALUES (?1, ?2)",
            params![event_id, member_id],
        )?;
    }
    Ok(())
}

/// Upsert a member's own intent.
pub fn set_intent(
    conn: &Connection,
    event_id: i64,
    member_id: i64,
    intended_status: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO event_attendance (event_id, member_id, intended_status) VALUES (?1, ?2, ?3) \
         ON CONFLICT(event_id, member_id) DO UPDATE SET \
             intended_status = excluded.intended_status, \
             updated_at = datetime('now')",
        params![event_id, member_id, intended_status],
    )?;
    Ok(())
}

/// Record the outcome an organizer observed. Creates the row if the member
/// never responded.
pub fn record_actual(
    conn: &Connection,
    event_id: i64,
    member_id: i64,
    actual_status: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO event_attendance (event_id, member_id, actual_status) VALUES (?1, ?2, ?3) \
         ON CONFLICT(event_id, member_id) DO UPDATE SET \
             actual_status = excluded.actual_status, \
             updated_at = datetime('now')",
        params![event_id, member_id, actual_status],
    )?;
    Ok(())
}

pub fn find_by_event(conn: &Connection, event_id: i64) -> rusqlite::Result<Vec<AttendanceRow>> {
    let sql = format!("{SELECT_ATTENDANCE} ORDER BY member_name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![event_id], row_to_attendance)?;
    rows.collect()
}

/// Summary counts for an event under its own attendance mode.
pub fn summarize_event(conn: &Connection, event: &Event) -> rusqlite::Result<AttendanceSummary> {
    let rows = find_by_event(conn, event.id)?;
    Ok(summarize(&rows, &event.attendance_mode))
}
