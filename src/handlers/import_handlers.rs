use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::import::{self, ImportPayload};
use crate::models::import::mapper;

/// POST /api/v1/import/members — run a spreadsheet import batch.
pub async fn import_members(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ImportPayload>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;

    if body.rows.is_empty() {
        return Err(AppError::Validation(vec!["No rows to import".to_string()]));
    }

    let result = import::import_members(&conn, ctx.choir_id, &body);

    log::info!(
        "Member import for choir {}: created={}, skipped={}, errors={}",
        ctx.choir_id,
        result.created,
        result.skipped,
        result.errors.len()
    );
    let details = serde_json::json!({
        "created": result.created,
        "skipped": result.skipped,
        "errors": result.errors.len(),
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "import.members", "choir", ctx.choir_id, details);

    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/v1/import/preview-mapping — dry-run the taxonomy mapper over raw
/// labels so the UI can show what an import would do. Unmapped values are the
/// ones that would create new taxonomy rows.
pub async fn preview_mapping(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    session::require_organizer(&session, &conn)?;

    let category = body
        .get("category")
        .and_then(|v| v.as_str())
        .unwrap_or("voice_group")
        .to_string();
    let raws: Vec<String> = body
        .get("values")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let mapping = mapper::build_mapping(&category, raws.iter().map(String::as_str));
    let unmapped: Vec<&String> = raws.iter().filter(|r| !mapping.contains_key(*r)).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "mapping": mapping,
        "unmapped": unmapped,
    })))
}
