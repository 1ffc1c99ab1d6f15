//! Reset a user's password to a generated temporary one.
//!
//! Identify the user with USER_ID or USER_EMAIL. The temporary password is
//! printed once; only the argon2 hash is stored.
//!
//!     USER_EMAIL=kari@example.com cargo run --bin reset_password
//!     USER_ID=42 cargo run --bin reset_password

use choirdinated::auth::password;
use choirdinated::db;
use choirdinated::models::user;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/choirdinated.db".to_string());

    let pool = db::init_pool(&database_path);
    let conn = pool.get().expect("Failed to get DB connection");

    let found = if let Ok(id) = std::env::var("USER_ID") {
        let id: i64 = id.parse().unwrap_or_else(|_| {
            eprintln!("USER_ID must be numeric");
            std::process::exit(1);
        });
        user::find_by_id(&conn, id)
    } else if let Ok(email) = std::env::var("USER_EMAIL") {
        user::find_by_email(&conn, &email)
    } else {
        eprintln!("Set USER_ID or USER_EMAIL");
        std::process::exit(1);
    };

    let found = match found {
        Ok(u) => u,
        Err(e) => {
            eprintln!("lookup failed: {e}");
            std::process::exit(1);
        }
    };

    let Some(u) = found else {
        eprintln!("no such user");
        std::process::exit(1);
    };

    let temp = password::generate_password(12);
    let hash = match password::hash_password(&temp) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("hash failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = user::update_password(&conn, u.id, &hash) {
        eprintln!("update failed: {e}");
        std::process::exit(1);
    }

    println!("password reset for {} (id {})", u.username, u.id);
    println!("temporary password: {temp}");
}
