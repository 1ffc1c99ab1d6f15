use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

/// Contiguous date range a member is active under. An open period
/// (end_date NULL) is what makes a member active.
#[derive(Debug, Clone)]
pub struct MembershipPeriod {
    pub id: i64,
    pub member_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub end_reason: String,
}

#[derive(Debug, Clone)]
pub struct MembershipLeave {
    pub id: i64,
    pub member_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub reason: String,
    pub created_at: String,
}

fn row_to_period(row: &rusqlite::Row) -> rusqlite::Result<MembershipPeriod> {
    Ok(MembershipPeriod {
        id: row.get("id")?,
        member_id: row.get("member_id")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        end_reason: row.get("end_reason")?,
    })
}

fn row_to_leave(row: &rusqlite::Row) -> rusqlite::Result<MembershipLeave> {
    Ok(MembershipLeave {
        id: row.get("id")?,
        member_id: row.get("member_id")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        status: row.get("status")?,
        reason: row.get("reason")?,
        created_at: row.get("created_at")?,
    })
}

/// Open a new period. Refuses nothing; callers guard against double-open via
/// `find_open_period`.
pub fn open_period(conn: &Connection, member_id: i64, start_date: NaiveDate) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO membership_periods (member_id, start_date) VALUES (?1, ?2)",
        params![member_id, start_date.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_open_period(conn: &Connection, member_id: i64) -> rusqlite::Result<Option<MembershipPeriod>> {
    conn.query_row(
        "SELECT id, member_id, start_date, end_date, end_reason \
         FROM membership_periods WHERE member_id = ?1 AND end_date IS NULL \
         ORDER BY start_date DESC LIMIT 1",
        params![member_id],
        row_to_period,
    )
    .optional()
}

pub fn find_periods(conn: &Connection, member_id: i64) -> rusqlite::Result<Vec<MembershipPeriod>> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, start_date, end_date, end_reason \
         FROM membership_periods WHERE member_id = ?1 ORDER BY start_date DESC",
    )?;
    let rows = stmt.query_map(params![member_id], row_to_period)?;
    rows.collect()
}

/// Close the open period, ending the membership. Returns false when there was
/// no open period to close.
pub fn close_open_period(
    conn: &Connection,
    member_id: i64,
    end_date: NaiveDate,
    end_reason: &str,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE membership_periods SET end_date = ?1, end_reason = ?2 \
         WHERE member_id = ?3 AND end_date IS NULL",
        params![end_date.to_string(), end_reason, member_id],
    )?;
    Ok(changed > 0)
}

pub fn request_leave(
    conn: &Connection,
    member_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO membership_leaves (member_id, start_date, end_date, reason) \
         VALUES (?1, ?2, ?3, ?4)",
        params![member_id, start_date.to_string(), end_date.to_string(), reason],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_leaves(conn: &Connection, member_id: i64) -> rusqlite::Result<Vec<MembershipLeave>> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, start_date, end_date, status, reason, created_at \
         FROM membership_leaves WHERE member_id = ?1 ORDER BY start_date DESC",
    )?;
    let rows = stmt.query_map(params![member_id], row_to_leave)?;
    rows.collect()
}

pub fn find_leave_by_id(conn: &Connection, leave_id: i64) -> rusqlite::Result<Option<MembershipLeave>> {
    conn.query_row(
        "SELECT id, member_id, start_date, end_date, status, reason, created_at \
         FROM membership_leaves WHERE id = ?1",
        params![leave_id],
        row_to_leave,
    )
    .optional()
}

/// Approve or reject a leave request.
pub fn set_leave_status(conn: &Connection, leave_id: i64, status: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE membership_leaves SET status = ?1 WHERE id = ?2",
        params![status, leave_id],
    )?;
    Ok(())
}

/// Whether the member has an approved leave covering the given date. Only
/// approved, date-current leaves suppress active status display.
pub fn is_on_leave(conn: &Connection, member_id: i64, on_date: NaiveDate) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM membership_leaves \
         WHERE member_id = ?1 AND status = 'approved' \
           AND start_date <= ?2 AND end_date >= ?2)",
        params![member_id, on_date.to_string()],
        |row| row.get(0),
    )
}
