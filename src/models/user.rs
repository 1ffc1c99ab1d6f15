use rusqlite::{Connection, OptionalExtension, params};

/// Auth account. Password hash only travels through the auth paths.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

const SELECT_USER: &str = "\
    SELECT id, username, email, password, display_name, created_at, updated_at FROM users";

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password: row.get("password")?,
        display_name: row.get("display_name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn create(conn: &Connection, new: &NewUser) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password, display_name) VALUES (?1, ?2, ?3, ?4)",
        params![new.username, new.email, new.password, new.display_name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_user).optional()
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE username = ?1");
    conn.query_row(&sql, params![username], row_to_user).optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE LOWER(email) = LOWER(?1)");
    conn.query_row(&sql, params![email], row_to_user).optional()
}

pub fn update_password(conn: &Connection, id: i64, password_hash: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET password = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![password_hash, id],
    )?;
    Ok(())
}

pub fn update_profile(
    conn: &Connection,
    id: i64,
    email: &str,
    display_name: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET email = ?1, display_name = ?2, updated_at = datetime('now') WHERE id = ?3",
        params![email, display_name, id],
    )?;
    Ok(())
}
