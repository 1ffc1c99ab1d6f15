use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use choirdinated::api_types::ApiErrorResponse;
use choirdinated::registry::RegistryClient;
use choirdinated::{audit, auth, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/choirdinated.db".to_string());
    if let Some(parent) = std::path::Path::new(&database_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }

    let pool = db::init_pool(&database_path);
    db::run_migrations(&pool);

    let admin_hash = auth::password::hash_password("admin123")
        .expect("Failed to hash default password");
    db::seed_initial(&pool, &admin_hash);

    {
        let conn = pool.get().expect("Failed to get connection for audit cleanup");
        audit::cleanup_old_entries(&conn);
    }

    // Session encryption key — load from SESSION_KEY env var for persistent
    // sessions across restarts.
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let registry_client = web::Data::new(
        RegistryClient::from_env().expect("Failed to create registry client"),
    );

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(registry_client.clone())
            // Public routes
            .route("/api/v1/auth/login", web::post().to(handlers::auth_handlers::login))
            // Protected API
            .service(
                web::scope("/api/v1")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/auth/logout", web::post().to(handlers::auth_handlers::logout))
                    .route("/auth/me", web::get().to(handlers::auth_handlers::me))
                    .route("/auth/choir", web::post().to(handlers::auth_handlers::select_choir))
                    // Members
                    .route("/members", web::get().to(handlers::member_handlers::list))
                    .route("/members", web::post().to(handlers::member_handlers::create))
                    .route("/members/{id}", web::get().to(handlers::member_handlers::read))
                    .route("/members/{id}", web::put().to(handlers::member_handlers::update))
                    .route("/members/{id}", web::delete().to(handlers::member_handlers::delete))
                    .route("/members/{id}/periods", web::get().to(handlers::member_handlers::list_periods))
                    .route("/members/{id}/end", web::post().to(handlers::member_handlers::end_membership))
                    .route("/members/{id}/reactivate", web::post().to(handlers::member_handlers::reactivate))
                    .route("/members/{id}/leaves", web::get().to(handlers::member_handlers::list_leaves))
                    .route("/members/{id}/leaves", web::post().to(handlers::member_handlers::request_leave))
                    .route("/leaves/{id}/status", web::put().to(handlers::member_handlers::set_leave_status))
                    // Events — /events/{id}/... before /events/{id} is not
                    // needed with explicit methods, but instances/attendance
                    // segments must come before the bare {id} GET.
                    .route("/events", web::get().to(handlers::event_handlers::list))
                    .route("/events", web::post().to(handlers::event_handlers::create))
                    .route("/events/{id}/instances", web::get().to(handlers::event_handlers::list_instances))
                    .route("/events/{id}/attendance", web::get().to(handlers::event_handlers::list_attendance))
                    .route("/events/{id}/attendance/my", web::put().to(handlers::event_handlers::set_my_intent))
                    .route("/events/{id}/attendance/actual", web::put().to(handlers::event_handlers::record_actual))
                    .route("/events/{id}", web::get().to(handlers::event_handlers::read))
                    .route("/events/{id}", web::put().to(handlers::event_handlers::update))
                    .route("/events/{id}", web::delete().to(handlers::event_handlers::delete))
                    // Taxonomy
                    .route("/values/diagnostics/orphan-voice-types", web::get().to(handlers::lov_handlers::orphan_voice_types))
                    .route("/values/{category}", web::get().to(handlers::lov_handlers::list))
                    .route("/values", web::post().to(handlers::lov_handlers::create))
                    .route("/values/{id}", web::put().to(handlers::lov_handlers::update))
                    .route("/values/{id}", web::delete().to(handlers::lov_handlers::deactivate))
                    // Choir settings
                    .route("/choir", web::get().to(handlers::choir_handlers::read))
                    .route("/choir", web::put().to(handlers::choir_handlers::update))
                    .route("/choir/holidays", web::get().to(handlers::choir_handlers::list_holidays))
                    // Import
                    .route("/import/members", web::post().to(handlers::import_handlers::import_members))
                    .route("/import/preview-mapping", web::post().to(handlers::import_handlers::preview_mapping))
                    // Business registry
                    .route("/registry/organizations", web::get().to(handlers::registry_handlers::search))
                    .route("/registry/organizations/{orgnr}", web::get().to(handlers::registry_handlers::lookup)),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound().json(ApiErrorResponse {
                    error: "Not found".to_string(),
                    details: None,
                })
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
