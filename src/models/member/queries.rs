use rusqlite::{Connection, OptionalExtension, params};

use super::types::{Member, MemberDisplay, MemberPage, NewMember};

/// SQL for member display: joined user profile, taxonomy display names, and
/// status derived from membership_periods + membership_leaves.
const SELECT_MEMBER_DISPLAY: &str = "\
    SELECT m.id, m.choir_id, m.user_id, m.role, \
           u.username, u.email, u.display_name, \
           m.membership_type_id, COALESCE(mt.display_name, '') AS membership_type, \
           m.voice_group_id, COALESCE(vg.display_name, '') AS voice_group, \
           m.voice_type_id, COALESCE(vt.display_name, '') AS voice_type, \
           CASE \
             WHEN EXISTS (SELECT 1 FROM membership_periods p \
                          WHERE p.member_id = m.id AND p.end_date IS NULL) \
             THEN CASE \
               WHEN EXISTS (SELECT 1 FROM membership_leaves l \
                            WHERE l.member_id = m.id AND l.status = 'approved' \
                              AND l.start_date <= date('now') AND l.end_date >= date('now')) \
               THEN 'on_leave' \
               ELSE 'active' \
             END \
             ELSE 'inactive' \
           END AS status, \
           COALESCE((SELECT p.start_date FROM membership_periods p \
                     WHERE p.member_id = m.id AND p.end_date IS NULL \
                     ORDER BY p.start_date DESC LIMIT 1), '') AS active_since, \
           m.created_at, m.updated_at \
    FROM members m \
    JOIN users u ON u.id = m.user_id \
    LEFT JOIN list_of_values mt ON mt.id = m.membership_type_id \
    LEFT JOIN list_of_values vg ON vg.id = m.voice_group_id \
    LEFT JOIN list_of_values vt ON vt.id = m.voice_type_id \
    WHERE m.choir_id = ?1";

fn row_to_member_display(row: &rusqlite::Row) -> rusqlite::Result<MemberDisplay> {
    Ok(MemberDisplay {
        id: row.get("id")?,
        choir_id: row.get("choir_id")?,
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        role: row.get("role")?,
        membership_type_id: row.get("membership_type_id")?,
        membership_type: row.get("membership_type")?,
        voice_group_id: row.get("voice_group_id")?,
        voice_group: row.get("voice_group")?,
        voice_type_id: row.get("voice_type_id")?,
        voice_type: row.get("voice_type")?,
        status: row.get("status")?,
        active_since: row.get("active_since")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Create the member row. The caller opens the first membership period.
pub fn create(conn: &Connection, choir_id: i64, new: &NewMember) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO members (choir_id, user_id, role, membership_type_id, voice_group_id, voice_type_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            choir_id,
            new.user_id,
            new.role,
            new.membership_type_id,
            new.voice_group_id,
            new.voice_type_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<Option<MemberDisplay>> {
    let sql = format!("{SELECT_MEMBER_DISPLAY} AND m.id = ?2");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![choir_id, id], row_to_member_display)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// The raw membership row for a user in any choir; tenant scope is always
/// resolved from this, never from a client-supplied choir id.
pub fn find_membership(
    conn: &Connection,
    user_id: i64,
    choir_id: Option<i64>,
) -> rusqlite::Result<Option<Member>> {
    let sql = "SELECT id, choir_id, user_id, role, membership_type_id, voice_group_id, voice_type_id, \
                      created_at, updated_at \
               FROM members WHERE user_id = ?1 \
               AND (?2 IS NULL OR choir_id = ?2) \
               ORDER BY id ASC LIMIT 1";
    conn.query_row(sql, params![user_id, choir_id], |row| {
        Ok(Member {
            id: row.get("id")?,
            choir_id: row.get("choir_id")?,
            user_id: row.get("user_id")?,
            role: row.get("role")?,
            membership_type_id: row.get("membership_type_id")?,
            voice_group_id: row.get("voice_group_id")?,
            voice_type_id: row.get("voice_type_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    })
    .optional()
}

/// All memberships for a user, as display rows (one per choir).
pub fn find_memberships_for_user(
    conn: &Connection,
    user_id: i64,
) -> rusqlite::Result<Vec<(i64, String, i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, m.id AS member_id, m.role \
         FROM members m JOIN choirs c ON c.id = m.choir_id \
         WHERE m.user_id = ?1 ORDER BY c.name ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;
    rows.collect()
}

pub fn find_paginated(
    conn: &Connection,
    choir_id: i64,
    page: i64,
    per_page: i64,
) -> rusqlite::Result<MemberPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM members WHERE choir_id = ?1",
        params![choir_id],
        |r| r.get(0),
    )?;

    let sql = format!("{SELECT_MEMBER_DISPLAY} ORDER BY u.display_name, u.username LIMIT ?2 OFFSET ?3");
    let mut stmt = conn.prepare(&sql)?;
    let members = stmt
        .query_map(params![choir_id, per_page, offset], row_to_member_display)?
        .collect::<Result<Vec<_>, _>>()?;

    let total_pages = ((total_count as f64) / (per_page as f64)).ceil() as i64;

    Ok(MemberPage {
        members,
        page,
        per_page,
        total_count,
        total_pages,
    })
}

/// Ids of members currently active (open period), used to materialize
/// attendance rows when an event is created.
pub fn find_active_ids(conn: &Connection, choir_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT m.id FROM members m \
         WHERE m.choir_id = ?1 \
           AND EXISTS (SELECT 1 FROM membership_periods p \
                       WHERE p.member_id = m.id AND p.end_date IS NULL) \
         ORDER BY m.id",
    )?;
    let rows = stmt.query_map(params![choir_id], |row| row.get(0))?;
    rows.collect()
}

pub fn update(
    conn: &Connection,
    choir_id: i64,
    id: i64,
    role: &str,
    membership_type_id: Option<i64>,
    voice_group_id: Option<i64>,
    voice_type_id: Option<i64>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE members SET role = ?1, membership_type_id = ?2, voice_group_id = ?3, \
         voice_type_id = ?4, updated_at = datetime('now') \
         WHERE id = ?5 AND choir_id = ?6",
        params![role, membership_type_id, voice_group_id, voice_type_id, id, choir_id],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM members WHERE id = ?1 AND choir_id = ?2",
        params![id, choir_id],
    )?;
    Ok(())
}
