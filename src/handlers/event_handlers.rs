use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::api_types::{
    ApiActualRequest, ApiAttendanceRowResponse, ApiEventDetailResponse, ApiEventRequest,
    ApiEventResponse, ApiIntentRequest, ApiRecurrenceRequest, ApiRecurringCreateResponse,
};
use crate::auth::{session, validate};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::attendance::{ACTUAL_STATUSES, INTENDED_STATUSES};
use crate::models::event::recurrence::{Frequency, RecurrenceEnd, RecurrenceRule};
use crate::models::event::types::format_datetime;
use crate::models::{attendance, choir, event, holiday, member};

fn parse_rule(req: &ApiRecurrenceRequest) -> Result<RecurrenceRule, Vec<String>> {
    let mut errors = Vec::new();

    let frequency = match req.frequency.as_str() {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "monthly" => Some(Frequency::Monthly),
        _ => {
            errors.push("recurrence.frequency must be one of: daily, weekly, monthly".to_string());
            None
        }
    };

    let end = match req.end_type.as_str() {
        "count" => match req.count {
            Some(n) if n > 0 => Some(RecurrenceEnd::Count(n)),
            _ => {
                errors.push("recurrence.count must be a positive number".to_string());
                None
            }
        },
        "until" => match &req.until {
            Some(s) => match validate::parse_date(s, "recurrence.until") {
                Ok(date) => Some(RecurrenceEnd::Until(date)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => {
                errors.push("recurrence.until is required when end_type is 'until'".to_string());
                None
            }
        },
        _ => {
            errors.push("recurrence.end_type must be 'count' or 'until'".to_string());
            None
        }
    };

    match (frequency, end) {
        (Some(frequency), Some(end)) if errors.is_empty() => Ok(RecurrenceRule {
            frequency,
            interval: req.interval.max(1),
            end,
            exclude_holidays: req.exclude_holidays,
        }),
        _ => Err(errors),
    }
}

fn parse_event_request(
    body: &ApiEventRequest,
    default_mode: &str,
) -> Result<event::NewEvent, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&body.title, "Title", 200));
    errors.extend(validate::validate_optional(&body.description, "Description", 2000));
    errors.extend(validate::validate_optional(&body.location, "Location", 200));

    let mode = body
        .attendance_mode
        .clone()
        .unwrap_or_else(|| default_mode.to_string());
    errors.extend(validate::validate_one_of(&mode, "Attendance mode", &["opt_in", "opt_out"]));

    let start_time = validate::parse_datetime_field(&body.start_time, "start_time");
    let end_time = validate::parse_datetime_field(&body.end_time, "end_time");
    if let Err(e) = &start_time {
        errors.push(e.clone());
    }
    if let Err(e) = &end_time {
        errors.push(e.clone());
    }
    if let (Ok(start), Ok(end)) = (&start_time, &end_time) {
        if end < start {
            errors.push("end_time must not precede start_time".to_string());
        }
    }

    match (start_time, end_time) {
        (Ok(start_time), Ok(end_time)) if errors.is_empty() => Ok(event::NewEvent {
            title: body.title.trim().to_string(),
            description: body.description.trim().to_string(),
            location: body.location.trim().to_string(),
            start_time,
            end_time,
            event_type_id: body.event_type_id,
            attendance_mode: mode,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// GET /api/v1/events — upcoming by default, `?when=past` for history.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let now = format_datetime(Utc::now().naive_utc());
    let events = match query.get("when").map(String::as_str) {
        Some("past") => event::find_past(&conn, ctx.choir_id, &now)?,
        _ => event::find_upcoming(&conn, ctx.choir_id, &now)?,
    };

    let response: Vec<ApiEventResponse> = events.into_iter().map(ApiEventResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/events/{id} — event with its attendance summary.
pub async fn read(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let found = event::find_by_id(&conn, ctx.choir_id, path.into_inner())?
        .ok_or(AppError::NotFound)?;
    let summary = attendance::summarize_event(&conn, &found)?;

    Ok(HttpResponse::Ok().json(ApiEventDetailResponse {
        event: ApiEventResponse::from(found),
        attendance: summary,
    }))
}

/// GET /api/v1/events/{id}/instances — generated occurrences of a series.
pub async fn list_instances(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let parent_id = path.into_inner();

    let parent = event::find_by_id(&conn, ctx.choir_id, parent_id)?
        .ok_or(AppError::NotFound)?;
    if !parent.is_recurring {
        return Err(AppError::Validation(vec![
            "Event is not a recurring series".to_string(),
        ]));
    }

    let instances = event::find_instances(&conn, ctx.choir_id, parent_id)?;
    let response: Vec<ApiEventResponse> = instances.into_iter().map(ApiEventResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/events — standalone or, with a recurrence block, a full
/// series. Attendance rows are materialized for currently active members.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ApiEventRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;

    let tenant = choir::find_by_id(&conn, ctx.choir_id)?.ok_or(AppError::NotFound)?;
    let new = parse_event_request(&body, &tenant.attendance_mode)?;
    let active_members = member::find_active_ids(&conn, ctx.choir_id)?;

    match &body.recurrence {
        None => {
            let event_id = event::create(&conn, ctx.choir_id, &new)?;
            attendance::seed_event(&conn, event_id, &active_members)?;

            let details = serde_json::json!({ "title": new.title });
            let _ = crate::audit::log(&conn, ctx.user_id, "event.created", "event", event_id, details);

            let created = event::find_by_id(&conn, ctx.choir_id, event_id)?
                .ok_or(AppError::NotFound)?;
            Ok(HttpResponse::Created().json(ApiEventResponse::from(created)))
        }
        Some(recurrence) => {
            let rule = parse_rule(recurrence).map_err(AppError::Validation)?;
            let holidays = if rule.exclude_holidays {
                holiday::dates_for_region(&conn, &tenant.holiday_region)?
            } else {
                Default::default()
            };

            let (parent_id, instance_ids) =
                event::create_recurring(&conn, ctx.choir_id, &new, &rule, &holidays)?;
            for instance_id in &instance_ids {
                attendance::seed_event(&conn, *instance_id, &active_members)?;
            }

            let details = serde_json::json!({
                "title": new.title,
                "instances": instance_ids.len(),
            });
            let _ = crate::audit::log(&conn, ctx.user_id, "event.series_created", "event", parent_id, details);

            let parent = event::find_by_id(&conn, ctx.choir_id, parent_id)?
                .ok_or(AppError::NotFound)?;
            Ok(HttpResponse::Created().json(ApiRecurringCreateResponse {
                parent: ApiEventResponse::from(parent),
                instance_count: instance_ids.len(),
                instance_ids,
            }))
        }
    }
}

/// PUT /api/v1/events/{id} — updates this row only; a series parent's
/// existing instances are never rewritten.
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiEventRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let event_id = path.into_inner();

    let existing = event::find_by_id(&conn, ctx.choir_id, event_id)?
        .ok_or(AppError::NotFound)?;
    let new = parse_event_request(&body, &existing.attendance_mode)?;
    event::update(&conn, ctx.choir_id, event_id, &new)?;

    let details = serde_json::json!({ "title": new.title });
    let _ = crate::audit::log(&conn, ctx.user_id, "event.updated", "event", event_id, details);

    let updated = event::find_by_id(&conn, ctx.choir_id, event_id)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiEventResponse::from(updated)))
}

/// DELETE /api/v1/events/{id} — deleting a series parent cascades to its
/// instances.
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let event_id = path.into_inner();

    event::find_by_id(&conn, ctx.choir_id, event_id)?.ok_or(AppError::NotFound)?;
    event::delete(&conn, ctx.choir_id, event_id)?;

    let details = serde_json::json!({ "summary": "Event deleted" });
    let _ = crate::audit::log(&conn, ctx.user_id, "event.deleted", "event", event_id, details);

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/events/{id}/attendance — per-member rows (organizer view).
pub async fn list_attendance(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let event_id = path.into_inner();

    event::find_by_id(&conn, ctx.choir_id, event_id)?.ok_or(AppError::NotFound)?;
    let rows = attendance::find_by_event(&conn, event_id)?
        .into_iter()
        .map(ApiAttendanceRowResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(rows))
}

/// PUT /api/v1/events/{id}/attendance/my — the caller's own intent.
pub async fn set_my_intent(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let event_id = path.into_inner();

    if let Some(err) =
        validate::validate_one_of(&body.intended_status, "Intended status", INTENDED_STATUSES)
    {
        return Err(AppError::Validation(vec![err]));
    }

    event::find_by_id(&conn, ctx.choir_id, event_id)?.ok_or(AppError::NotFound)?;
    attendance::set_intent(&conn, event_id, ctx.member_id, &body.intended_status)?;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/v1/events/{id}/attendance/actual — organizer records an outcome.
pub async fn record_actual(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiActualRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let event_id = path.into_inner();

    if let Some(err) =
        validate::validate_one_of(&body.actual_status, "Actual status", ACTUAL_STATUSES)
    {
        return Err(AppError::Validation(vec![err]));
    }

    event::find_by_id(&conn, ctx.choir_id, event_id)?.ok_or(AppError::NotFound)?;
    member::find_by_id(&conn, ctx.choir_id, body.member_id)?.ok_or(AppError::NotFound)?;
    attendance::record_actual(&conn, event_id, body.member_id, &body.actual_status)?;

    let details = serde_json::json!({
        "member_id": body.member_id,
        "actual_status": body.actual_status,
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "attendance.recorded", "event", event_id, details);

    Ok(HttpResponse::NoContent().finish())
}
