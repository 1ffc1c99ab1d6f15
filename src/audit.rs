use rusqlite::{Connection, params};
use serde_json::Value;

/// Retention window for audit entries, pruned at startup.
const RETENTION_DAYS: i64 = 365;

#[derive(Debug)]
pub enum AuditError {
    Db(rusqlite::Error),
}

impl From<rusqlite::Error> for AuditError {
    fn from(err: rusqlite::Error) -> Self {
        AuditError::Db(err)
    }
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::Db(e) => write!(f, "Database error: {e}"),
        }
    }
}

/// Append an audit entry. Handlers call this after a successful mutation and
/// ignore the result — an audit failure never fails the request.
pub fn log(
    conn: &Connection,
    user_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> Result<(), AuditError> {
    conn.execute(
        "INSERT INTO audit_log (user_id, action, target_type, target_id, details) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, action, target_type, target_id, details.to_string()],
    )?;
    Ok(())
}

/// Drop entries older than the retention window.
pub fn cleanup_old_entries(conn: &Connection) {
    let result = conn.execute(
        "DELETE FROM audit_log WHERE created_at < datetime('now', ?1)",
        params![format!("-{RETENTION_DAYS} days")],
    );
    match result {
        Ok(removed) if removed > 0 => log::info!("Audit cleanup removed {removed} entries"),
        Ok(_) => {}
        Err(e) => log::warn!("Audit cleanup failed: {e}"),
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: String,
    pub created_at: String,
}

/// Recent entries, newest first.
pub fn find_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action, target_type, target_id, details, created_at \
         FROM audit_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(AuditEntry {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            action: row.get("action")?,
            target_type: row.get("target_type")?,
            target_id: row.get("target_id")?,
            details: row.get("details")?,
            created_at: row.get("created_at")?,
        })
    })?;
    rows.collect()
}
