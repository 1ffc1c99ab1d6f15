//! Shared test infrastructure for model layer tests.
//!
//! `setup_test_db()` creates a temporary SQLite database with the full schema
//! and one seeded choir. Fixture helpers insert users, members, and taxonomy
//! rows the way the handlers do.

use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::TempDir;

use choirdinated::db::MIGRATIONS;
use choirdinated::models::{choir, list_of_value, member, membership, user};

pub const TEST_CHOIR: &str = "Testkoret";

/// Setup a test database with schema and a single choir.
///
/// Returns (TempDir, Connection, choir_id); the TempDir must be kept alive
/// for the Connection to remain valid.
pub fn setup_test_db() -> (TempDir, Connection, i64) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");
    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");
    conn.execute_batch(MIGRATIONS).expect("Failed to run migrations");

    let choir_id = choir::create(&conn, TEST_CHOIR, "opt_in", "NO").expect("Failed to create choir");
    (dir, conn, choir_id)
}

/// Insert a user with a throwaway (pre-hashed-looking) password.
pub fn insert_user(conn: &Connection, username: &str) -> i64 {
    user::create(
        conn,
        &user::NewUser {
            username: username.to_string(),
            email: format!("{username}@test.example"),
            password: "$argon2id$test-hash".to_string(),
            display_name: username.to_string(),
        },
    )
    .expect("Failed to create user")
}

/// Insert a member with an open period starting on the given date.
pub fn insert_active_member(conn: &Connection, choir_id: i64, username: &str, start: &str) -> i64 {
    let user_id = insert_user(conn, username);
    let member_id = member::create(
        conn,
        choir_id,
        &member::NewMember {
            user_id,
            role: "member".to_string(),
            membership_type_id: None,
            voice_group_id: None,
            voice_type_id: None,
        },
    )
    .expect("Failed to create member");
    let start: NaiveDate = start.parse().expect("bad start date");
    membership::open_period(conn, member_id, start).expect("Failed to open period");
    member_id
}

#[allow(dead_code)]
pub fn insert_voice_group(conn: &Connection, choir_id: i64, display_name: &str) -> i64 {
    list_of_value::create(
        conn,
        choir_id,
        &list_of_value::NewListOfValue {
            category: "voice_group".to_string(),
            value: display_name.to_lowercase(),
            display_name: display_name.to_string(),
            parent_id: None,
            sort_order: 0,
        },
    )
    .expect("Failed to create voice group")
}
