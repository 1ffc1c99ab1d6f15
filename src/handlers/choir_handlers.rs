use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_types::{ApiChoirResponse, ApiChoirSettingsRequest};
use crate::auth::{session, validate};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{choir, holiday};

/// GET /api/v1/choir — the caller's tenant settings.
pub async fn read(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let tenant = choir::find_by_id(&conn, ctx.choir_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiChoirResponse::from(tenant)))
}

/// PUT /api/v1/choir — admin only. The attendance default applies to events
/// created afterwards; stored events keep their own mode.
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ApiChoirSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    if ctx.role != "admin" {
        return Err(AppError::PermissionDenied("admin".to_string()));
    }

    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&body.name, "Name", 200));
    errors.extend(validate::validate_one_of(
        &body.attendance_mode,
        "Attendance mode",
        &["opt_in", "opt_out"],
    ));
    errors.extend(validate::validate_optional(&body.holiday_region, "Holiday region", 10));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    choir::update_settings(
        &conn,
        ctx.choir_id,
        body.name.trim(),
        &body.attendance_mode,
        body.holiday_region.trim(),
    )?;

    let details = serde_json::json!({
        "attendance_mode": body.attendance_mode,
        "holiday_region": body.holiday_region,
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "choir.settings_updated", "choir", ctx.choir_id, details);

    let updated = choir::find_by_id(&conn, ctx.choir_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiChoirResponse::from(updated)))
}

/// GET /api/v1/choir/holidays — the tenant's active holiday calendar.
pub async fn list_holidays(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let tenant = choir::find_by_id(&conn, ctx.choir_id)?.ok_or(AppError::NotFound)?;
    let holidays = holiday::find_by_region(&conn, &tenant.holiday_region)?;

    let response: Vec<serde_json::Value> = holidays
        .into_iter()
        .map(|h| {
            serde_json::json!({
                "date": h.holiday_date,
                "name": h.name,
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}
