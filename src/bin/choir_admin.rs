//! List choirs, preview a delete's cascading impact, or delete a choir.
//!
//!     cargo run --bin choir_admin                        # list all choirs
//!     CHOIR_ID=3 cargo run --bin choir_admin             # preview cascade
//!     CHOIR_ID=3 CONFIRM_DELETE=1 cargo run --bin choir_admin

use choirdinated::db;
use choirdinated::models::choir;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/choirdinated.db".to_string());

    let pool = db::init_pool(&database_path);
    let conn = pool.get().expect("Failed to get DB connection");

    let choir_id: Option<i64> = std::env::var("CHOIR_ID").ok().and_then(|v| v.parse().ok());

    let Some(choir_id) = choir_id else {
        let choirs = match choir::find_all(&conn) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("listing failed: {e}");
                std::process::exit(1);
            }
        };
        println!("{} choirs:", choirs.len());
        for c in choirs {
            let counts = choir::cascade_counts(&conn, c.id).unwrap_or(choir::ChoirCounts {
                members: 0,
                periods: 0,
                leaves: 0,
                events: 0,
                attendance_rows: 0,
                taxonomy_rows: 0,
            });
            println!(
                "  id={} name={:?} mode={} members={} events={}",
                c.id, c.name, c.attendance_mode, counts.members, counts.events
            );
        }
        return;
    };

    let target = match choir::find_by_id(&conn, choir_id) {
        Ok(Some(c)) => c,
        Ok(None) => {
            eprintln!("no choir with id {choir_id}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("lookup failed: {e}");
            std::process::exit(1);
        }
    };

    let counts = match choir::cascade_counts(&conn, choir_id) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("count failed: {e}");
            std::process::exit(1);
        }
    };

    println!("choir {} ({:?}) — deleting would remove:", target.id, target.name);
    println!("  members:         {}", counts.members);
    println!("  periods:         {}", counts.periods);
    println!("  leaves:          {}", counts.leaves);
    println!("  events:          {}", counts.events);
    println!("  attendance rows: {}", counts.attendance_rows);
    println!("  taxonomy rows:   {}", counts.taxonomy_rows);

    if std::env::var("CONFIRM_DELETE").map(|v| v == "1").unwrap_or(false) {
        if let Err(e) = choir::delete(&conn, choir_id) {
            eprintln!("delete failed: {e}");
            std::process::exit(1);
        }
        println!("choir {choir_id} deleted");
    } else {
        println!("preview only — set CONFIRM_DELETE=1 to delete");
    }
}
