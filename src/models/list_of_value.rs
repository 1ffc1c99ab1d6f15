use rusqlite::{Connection, params};

/// Tenant-scoped taxonomy row: voice groups/types, membership types, event types.
/// Voice types reference their voice group via parent_id; a NULL parent is valid
/// but reported by `find_orphan_voice_types`.
#[derive(Debug, Clone)]
pub struct ListOfValue {
    pub id: i64,
    pub choir_id: i64,
    pub category: String,
    pub value: String,
    pub display_name: String,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
}

pub struct NewListOfValue {
    pub category: String,
    pub value: String,
    pub display_name: String,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
}

const SELECT_LOV: &str = "\
    SELECT id, choir_id, category, value, display_name, parent_id, sort_order, is_active \
    FROM list_of_values";

fn row_to_lov(row: &rusqlite::Row) -> rusqlite::Result<ListOfValue> {
    Ok(ListOfValue {
        id: row.get("id")?,
        choir_id: row.get("choir_id")?,
        category: row.get("category")?,
        value: row.get("value")?,
        display_name: row.get("display_name")?,
        parent_id: row.get("parent_id")?,
        sort_order: row.get("sort_order")?,
        is_active: row.get("is_active")?,
    })
}

pub fn create(conn: &Connection, choir_id: i64, new: &NewListOfValue) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO list_of_values (choir_id, category, value, display_name, parent_id, sort_order) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            choir_id,
            new.category,
            new.value,
            new.display_name,
            new.parent_id,
            new.sort_order
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<Option<ListOfValue>> {
    let sql = format!("{SELECT_LOV} WHERE id = ?1 AND choir_id = ?2");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id, choir_id], row_to_lov)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_by_category(
    conn: &Connection,
    choir_id: i64,
    category: &str,
) -> rusqlite::Result<Vec<ListOfValue>> {
    let sql = format!(
        "{SELECT_LOV} WHERE choir_id = ?1 AND category = ?2 AND is_active = 1 \
         ORDER BY sort_order, display_name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![choir_id, category], row_to_lov)?;
    rows.collect()
}

/// Case-insensitive lookup against both `value` and `display_name`.
/// Import resolution goes through here so that casing/format drift in source
/// spreadsheets does not create duplicate taxonomy rows.
pub fn resolve(
    conn: &Connection,
    choir_id: i64,
    category: &str,
    raw: &str,
) -> rusqlite::Result<Option<ListOfValue>> {
    let sql = format!(
        "{SELECT_LOV} WHERE choir_id = ?1 AND category = ?2 \
         AND (LOWER(value) = LOWER(?3) OR LOWER(display_name) = LOWER(?3)) \
         LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![choir_id, category, raw.trim()], row_to_lov)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Resolve an existing row or insert a new one. `value` is stored lowercased,
/// `display_name` keeps the given casing.
pub fn resolve_or_create(
    conn: &Connection,
    choir_id: i64,
    category: &str,
    display_name: &str,
    parent_id: Option<i64>,
) -> rusqlite::Result<i64> {
    if let Some(existing) = resolve(conn, choir_id, category, display_name)? {
        return Ok(existing.id);
    }
    let new = NewListOfValue {
        category: category.to_string(),
        value: display_name.trim().to_lowercase(),
        display_name: display_name.trim().to_string(),
        parent_id,
        sort_order: 0,
    };
    create(conn, choir_id, &new)
}

pub fn update(
    conn: &Connection,
    choir_id: i64,
    id: i64,
    display_name: &str,
    parent_id: Option<i64>,
    sort_order: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE list_of_values SET display_name = ?1, parent_id = ?2, sort_order = ?3 \
         WHERE id = ?4 AND choir_id = ?5",
        params![display_name, parent_id, sort_order, id, choir_id],
    )?;
    Ok(())
}

/// Soft-delete: rows stay referenced by members/events, so they are
/// deactivated rather than removed.
pub fn deactivate(conn: &Connection, choir_id: i64, id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE list_of_values SET is_active = 0 WHERE id = ?1 AND choir_id = ?2",
        params![id, choir_id],
    )?;
    Ok(())
}

/// Voice types with no parent voice group. Valid data, but usually a sign of a
/// sloppy import; surfaced in diagnostics.
pub fn find_orphan_voice_types(conn: &Connection, choir_id: i64) -> rusqlite::Result<Vec<ListOfValue>> {
    let sql = format!(
        "{SELECT_LOV} WHERE choir_id = ?1 AND category = 'voice_type' \
         AND parent_id IS NULL AND is_active = 1 \
         ORDER BY display_name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![choir_id], row_to_lov)?;
    rows.collect()
}
