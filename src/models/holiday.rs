use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Holiday {
    pub id: i64,
    pub region: String,
    pub holiday_date: String,
    pub name: String,
}

pub fn add(conn: &Connection, region: &str, date: NaiveDate, name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO holidays (region, holiday_date, name) VALUES (?1, ?2, ?3)",
        params![region, date.to_string(), name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_region(conn: &Connection, region: &str) -> rusqlite::Result<Vec<Holiday>> {
    let mut stmt = conn.prepare(
        "SELECT id, region, holiday_date, name FROM holidays \
         WHERE region = ?1 ORDER BY holiday_date ASC",
    )?;
    let rows = stmt.query_map(params![region], |row| {
        Ok(Holiday {
            id: row.get("id")?,
            region: row.get("region")?,
            holiday_date: row.get("holiday_date")?,
            name: row.get("name")?,
        })
    })?;
    rows.collect()
}

/// Calendar dates for a region, for recurrence expansion. Rows with a date
/// that fails to parse are dropped.
pub fn dates_for_region(conn: &Connection, region: &str) -> rusqlite::Result<HashSet<NaiveDate>> {
    let mut stmt = conn.prepare("SELECT holiday_date FROM holidays WHERE region = ?1")?;
    let rows = stmt.query_map(params![region], |row| row.get::<_, String>(0))?;
    let mut dates = HashSet::new();
    for row in rows {
        if let Ok(date) = row?.parse::<NaiveDate>() {
            dates.insert(date);
        }
    }
    Ok(dates)
}
