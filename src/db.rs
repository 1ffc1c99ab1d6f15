use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::models::{choir, list_of_value, member, membership, user};

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_path: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Default voice-group taxonomy for a fresh choir, with its 1/2 subdivisions.
fn seed_taxonomy(conn: &rusqlite::Connection, choir_id: i64) -> rusqlite::Result<()> {
    for (order, group) in ["Sopran", "Alt", "Tenor", "Bass"].iter().enumerate() {
        let group_id = list_of_value::create(
            conn,
            choir_id,
            &list_of_value::NewListOfValue {
                category: "voice_group".to_string(),
                value: group.to_lowercase(),
                display_name: group.to_string(),
                parent_id: None,
                sort_order: order as i64,
            },
        )?;
        for n in 1..=2 {
            let display = format!("{n}. {group}");
            list_of_value::create(
                conn,
                choir_id,
                &list_of_value::NewListOfValue {
                    category: "voice_type".to_string(),
                    value: display.to_lowercase(),
                    display_name: display,
                    parent_id: Some(group_id),
                    sort_order: (order * 2 + n as usize) as i64,
                },
            )?;
        }
    }
    for (order, mt) in ["Fast medlem", "Prosjektmedlem", "Støttemedlem"].iter().enumerate() {
        list_of_value::create(
            conn,
            choir_id,
            &list_of_value::NewListOfValue {
                category: "membership_type".to_string(),
                value: mt.to_lowercase(),
                display_name: mt.to_string(),
                parent_id: None,
                sort_order: order as i64,
            },
        )?;
    }
    for (order, et) in ["Øvelse", "Konsert", "Seminar"].iter().enumerate() {
        list_of_value::create(
            conn,
            choir_id,
            &list_of_value::NewListOfValue {
                category: "event_type".to_string(),
                value: et.to_lowercase(),
                display_name: et.to_string(),
                parent_id: None,
                sort_order: order as i64,
            },
        )?;
    }
    Ok(())
}

/// Seed an admin user and a starter choir if the database is empty.
/// Idempotent: skipped as soon as any user exists.
pub fn seed_initial(pool: &DbPool, admin_password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already seeded ({count} users), skipping seed");
        return;
    }

    let seed = || -> rusqlite::Result<()> {
        let admin_id = user::create(
            &conn,
            &user::NewUser {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: admin_password_hash.to_string(),
                display_name: "Administrator".to_string(),
            },
        )?;
        let choir_id = choir::create(&conn, "Demokoret", "opt_out", "NO")?;
        seed_taxonomy(&conn, choir_id)?;
        let member_id = member::create(
            &conn,
            choir_id,
            &member::NewMember {
                user_id: admin_id,
                role: "admin".to_string(),
                membership_type_id: None,
                voice_group_id: None,
                voice_type_id: None,
            },
        )?;
        membership::open_period(&conn, member_id, chrono::Utc::now().date_naive())?;

        // A starting set of national holidays so recurrence exclusion has
        // something to bite on; operators maintain the rest.
        let holidays = [
            ("2026-01-01", "Første nyttårsdag"),
            ("2026-04-02", "Skjærtorsdag"),
            ("2026-04-03", "Langfredag"),
            ("2026-04-06", "Andre påskedag"),
            ("2026-05-01", "Arbeidernes dag"),
            ("2026-05-17", "Grunnlovsdag"),
            ("2026-12-25", "Første juledag"),
            ("2026-12-26", "Andre juledag"),
        ];
        for (date, name) in holidays {
            conn.execute(
                "INSERT OR IGNORE INTO holidays (region, holiday_date, name) VALUES ('NO', ?1, ?2)",
                params![date, name],
            )?;
        }
        Ok(())
    };

    match seed() {
        Ok(()) => log::info!("Initial seed complete"),
        Err(e) => log::error!("Initial seed failed: {e}"),
    }
}
