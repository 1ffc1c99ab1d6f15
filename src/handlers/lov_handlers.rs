use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_types::{ApiLovRequest, ApiLovResponse};
use crate::auth::{session, validate};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::list_of_value;

const CATEGORIES: &[&str] = &["voice_group", "voice_type", "membership_type", "event_type"];

/// GET /api/v1/values/{category}
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let category = path.into_inner();

    if let Some(err) = validate::validate_one_of(&category, "Category", CATEGORIES) {
        return Err(AppError::Validation(vec![err]));
    }

    let values = list_of_value::find_by_category(&conn, ctx.choir_id, &category)?
        .into_iter()
        .map(ApiLovResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(values))
}

/// POST /api/v1/values
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ApiLovRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_one_of(&body.category, "Category", CATEGORIES));
    errors.extend(validate::validate_required(&body.display_name, "Display name", 100));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Reject duplicates across both stored fields before inserting.
    if list_of_value::resolve(&conn, ctx.choir_id, &body.category, &body.display_name)?.is_some() {
        return Err(AppError::Validation(vec![format!(
            "A {} named '{}' already exists",
            body.category, body.display_name
        )]));
    }

    if let Some(parent_id) = body.parent_id {
        list_of_value::find_by_id(&conn, ctx.choir_id, parent_id)?.ok_or(AppError::NotFound)?;
    }

    let value = body
        .value
        .clone()
        .unwrap_or_else(|| body.display_name.trim().to_lowercase());
    let id = list_of_value::create(
        &conn,
        ctx.choir_id,
        &list_of_value::NewListOfValue {
            category: body.category.clone(),
            value,
            display_name: body.display_name.trim().to_string(),
            parent_id: body.parent_id,
            sort_order: body.sort_order,
        },
    )?;

    let details = serde_json::json!({
        "category": body.category,
        "display_name": body.display_name,
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "value.created", "list_of_value", id, details);

    let created = list_of_value::find_by_id(&conn, ctx.choir_id, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(ApiLovResponse::from(created)))
}

/// PUT /api/v1/values/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiLovRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let id = path.into_inner();

    list_of_value::find_by_id(&conn, ctx.choir_id, id)?.ok_or(AppError::NotFound)?;

    if let Some(err) = validate::validate_required(&body.display_name, "Display name", 100) {
        return Err(AppError::Validation(vec![err]));
    }
    if let Some(parent_id) = body.parent_id {
        list_of_value::find_by_id(&conn, ctx.choir_id, parent_id)?.ok_or(AppError::NotFound)?;
    }

    list_of_value::update(
        &conn,
        ctx.choir_id,
        id,
        body.display_name.trim(),
        body.parent_id,
        body.sort_order,
    )?;

    let details = serde_json::json!({ "display_name": body.display_name });
    let _ = crate::audit::log(&conn, ctx.user_id, "value.updated", "list_of_value", id, details);

    let updated = list_of_value::find_by_id(&conn, ctx.choir_id, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiLovResponse::from(updated)))
}

/// DELETE /api/v1/values/{id} — deactivates; referencing members/events keep
/// their assignment.
pub async fn deactivate(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let id = path.into_inner();

    list_of_value::find_by_id(&conn, ctx.choir_id, id)?.ok_or(AppError::NotFound)?;
    list_of_value::deactivate(&conn, ctx.choir_id, id)?;

    let details = serde_json::json!({ "summary": "Value deactivated" });
    let _ = crate::audit::log(&conn, ctx.user_id, "value.deactivated", "list_of_value", id, details);

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/values/diagnostics/orphan-voice-types
pub async fn orphan_voice_types(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let orphans = list_of_value::find_orphan_voice_types(&conn, ctx.choir_id)?
        .into_iter()
        .map(ApiLovResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orphans))
}
