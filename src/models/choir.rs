use rusqlite::{Connection, params};

/// A choir is the tenant root; every domain row is scoped to one.
#[derive(Debug, Clone)]
pub struct Choir {
    pub id: i64,
    pub name: String,
    pub attendance_mode: String,
    pub holiday_region: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-choir counts used by listing and cascade-impact reporting.
#[derive(Debug, Clone)]
pub struct ChoirCounts {
    pub members: i64,
    pub periods: i64,
    pub leaves: i64,
    pub events: i64,
    pub attendance_rows: i64,
    pub taxonomy_rows: i64,
}

fn row_to_choir(row: &rusqlite::Row) -> rusqlite::Result<Choir> {
    Ok(Choir {
        id: row.get("id")?,
        name: row.get("name")?,
        attendance_mode: row.get("attendance_mode")?,
        holiday_region: row.get("holiday_region")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn create(
    conn: &Connection,
    name: &str,
    attendance_mode: &str,
    holiday_region: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO choirs (name, attendance_mode, holiday_region) VALUES (?1, ?2, ?3)",
        params![name, attendance_mode, holiday_region],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Choir>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, attendance_mode, holiday_region, created_at, updated_at \
         FROM choirs WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_choir)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Choir>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, attendance_mode, holiday_region, created_at, updated_at \
         FROM choirs ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], row_to_choir)?;
    rows.collect()
}

/// Update tenant settings. The stored per-event attendance_mode is not
/// rewritten; new events pick up the new default at creation time.
pub fn update_settings(
    conn: &Connection,
    id: i64,
    name: &str,
    attendance_mode: &str,
    holiday_region: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE choirs SET name = ?1, attendance_mode = ?2, holiday_region = ?3, \
         updated_at = datetime('now') WHERE id = ?4",
        params![name, attendance_mode, holiday_region, id],
    )?;
    Ok(())
}

/// Tally everything a choir delete would take with it.
pub fn cascade_counts(conn: &Connection, choir_id: i64) -> rusqlite::Result<ChoirCounts> {
    let members = conn.query_row(
        "SELECT COUNT(*) FROM members WHERE choir_id = ?1",
        params![choir_id],
        |r| r.get(0),
    )?;
    let periods = conn.query_row(
        "SELECT COUNT(*) FROM membership_periods WHERE member_id IN \
         (SELECT id FROM members WHERE choir_id = ?1)",
        params![choir_id],
        |r| r.get(0),
    )?;
    let leaves = conn.query_row(
        "SELECT COUNT(*) FROM membership_leaves WHERE member_id IN \
         (SELECT id FROM members WHERE choir_id = ?1)",
        params![choir_id],
        |r| r.get(0),
    )?;
    let events = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE choir_id = ?1",
        params![choir_id],
        |r| r.get(0),
    )?;
    let attendance_rows = conn.query_row(
        "SELECT COUNT(*) FROM event_attendance WHERE event_id IN \
         (SELECT id FROM events WHERE choir_id = ?1)",
        params![choir_id],
        |r| r.get(0),
    )?;
    let taxonomy_rows = conn.query_row(
        "SELECT COUNT(*) FROM list_of_values WHERE choir_id = ?1",
        params![choir_id],
        |r| r.get(0),
    )?;
    Ok(ChoirCounts {
        members,
        periods,
        leaves,
        events,
        attendance_rows,
        taxonomy_rows,
    })
}

/// Delete a choir; foreign keys cascade to members, periods, leaves, events,
/// attendance, and taxonomy rows.
pub fn delete(conn: &Connection, choir_id: i64) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM choirs WHERE id = ?1", params![choir_id])?;
    Ok(())
}
