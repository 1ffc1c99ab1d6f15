//! Analyze and repair orphaned membership data.
//!
//! Reports members whose user row is missing, members with no membership
//! period at all, and recurring parents with zero generated instances.
//! Dry-run by default; set APPLY=1 to write fixes.
//!
//!     DATABASE_PATH=data/choirdinated.db cargo run --bin fix_orphan_members
//!     APPLY=1 cargo run --bin fix_orphan_members

use chrono::Utc;
use rusqlite::params;

use choirdinated::db;
use choirdinated::models::event;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/choirdinated.db".to_string());
    let apply = std::env::var("APPLY").map(|v| v == "1").unwrap_or(false);

    let pool = db::init_pool(&database_path);
    let conn = pool.get().expect("Failed to get DB connection");

    // Members pointing at a user row that no longer exists.
    let mut stmt = conn
        .prepare(
            "SELECT m.id, m.choir_id, m.user_id FROM members m \
             WHERE NOT EXISTS (SELECT 1 FROM users u WHERE u.id = m.user_id) \
             ORDER BY m.id",
        )
        .expect("prepare failed");
    let missing_users: Vec<(i64, i64, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .expect("query failed")
        .collect::<Result<_, _>>()
        .expect("row read failed");

    println!("members with missing user row: {}", missing_users.len());
    for (member_id, choir_id, user_id) in &missing_users {
        println!("  member={member_id} choir={choir_id} dangling user_id={user_id}");
    }
    if apply && !missing_users.is_empty() {
        let mut removed = 0;
        for (member_id, _, _) in &missing_users {
            removed += conn
                .execute("DELETE FROM members WHERE id = ?1", params![member_id])
                .unwrap_or(0);
        }
        println!("  -> removed {removed} orphaned members (periods/leaves cascade)");
    }

    // Members without any membership period: lifecycle state is undefined for
    // these, so open one starting today.
    let mut stmt = conn
        .prepare(
            "SELECT m.id, m.choir_id FROM members m \
             WHERE NOT EXISTS (SELECT 1 FROM membership_periods p WHERE p.member_id = m.id) \
             ORDER BY m.id",
        )
        .expect("prepare failed");
    let no_period: Vec<(i64, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query failed")
        .collect::<Result<_, _>>()
        .expect("row read failed");

    println!("members with no membership period: {}", no_period.len());
    for (member_id, choir_id) in &no_period {
        println!("  member={member_id} choir={choir_id}");
    }
    if apply && !no_period.is_empty() {
        let today = Utc::now().date_naive().to_string();
        let mut opened = 0;
        for (member_id, _) in &no_period {
            opened += conn
                .execute(
                    "INSERT INTO membership_periods (member_id, start_date) VALUES (?1, ?2)",
                    params![member_id, today],
                )
                .unwrap_or(0);
        }
        println!("  -> opened {opened} membership periods starting {today}");
    }

    // Recurring parents with no instances — either an exhausted rule or a
    // partial failure during series creation. Reported only; deciding whether
    // to regenerate or delete is the operator's call.
    let empty_parents =
        event::find_parents_without_instances(&conn).expect("parent scan failed");
    println!("recurring parents with zero instances: {}", empty_parents.len());
    for (event_id, choir_id, title) in &empty_parents {
        println!("  event={event_id} choir={choir_id} title={title:?}");
    }

    if !apply {
        println!("dry run — set APPLY=1 to write fixes");
    }
}
