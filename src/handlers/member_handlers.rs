use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::api_types::{
    ApiEndMembershipRequest, ApiLeaveRequest, ApiLeaveResponse, ApiLeaveStatusRequest,
    ApiMemberCreateRequest, ApiMemberResponse, ApiMemberUpdateRequest, ApiPeriodResponse,
    ApiReactivateRequest, PaginatedResponse,
};
use crate::auth::{password, session, validate};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{member, membership, user};

const ROLES: &[&str] = &["admin", "conductor", "member"];

/// GET /api/v1/members — paginated list for the caller's choir.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(25)
        .clamp(1, 100);

    let member_page = member::find_paginated(&conn, ctx.choir_id, page, per_page)?;

    let response = PaginatedResponse {
        items: member_page
            .members
            .into_iter()
            .map(ApiMemberResponse::from)
            .collect::<Vec<_>>(),
        page: member_page.page,
        per_page: member_page.per_page,
        total: member_page.total_count,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/members/{id}
pub async fn read(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;

    let found = member::find_by_id(&conn, ctx.choir_id, path.into_inner())?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiMemberResponse::from(found)))
}

/// POST /api/v1/members — link an existing user or create a fresh account
/// with a generated password, then open the first membership period.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ApiMemberCreateRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_one_of(&body.role, "Role", ROLES));
    if body.user_id.is_none() {
        match &body.email {
            Some(email) => errors.extend(validate::validate_email(email)),
            None => errors.push("Either user_id or email is required".to_string()),
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let start_date = match &body.start_date {
        Some(s) => validate::parse_date(s, "start_date")
            .map_err(|e| AppError::Validation(vec![e]))?,
        None => Utc::now().date_naive(),
    };

    let user_id = match body.user_id {
        Some(id) => {
            user::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
            id
        }
        None => {
            let email = body.email.as_deref().unwrap_or_default().trim().to_string();
            match user::find_by_email(&conn, &email)? {
                Some(u) => u.id,
                None => {
                    let base = email.split('@').next().unwrap_or("member").to_lowercase();
                    let mut username = base.clone();
                    let mut counter = 1;
                    while user::find_by_username(&conn, &username)?.is_some() {
                        counter += 1;
                        username = format!("{base}{counter}");
                    }
                    let temp = password::generate_password(12);
                    let hash = password::hash_password(&temp).map_err(AppError::Hash)?;
                    user::create(
                        &conn,
                        &user::NewUser {
                            username,
                            email,
                            password: hash,
                            display_name: body.display_name.clone().unwrap_or_default(),
                        },
                    )?
                }
            }
        }
    };

    if member::find_membership(&conn, user_id, Some(ctx.choir_id))?.is_some() {
        return Err(AppError::Validation(vec![
            "User is already a member of this choir".to_string(),
        ]));
    }

    let member_id = member::create(
        &conn,
        ctx.choir_id,
        &member::NewMember {
            user_id,
            role: body.role.clone(),
            membership_type_id: body.membership_type_id,
            voice_group_id: body.voice_group_id,
            voice_type_id: body.voice_type_id,
        },
    )?;
    membership::open_period(&conn, member_id, start_date)?;

    let details = serde_json::json!({
        "user_id": user_id,
        "role": body.role,
        "start_date": start_date.to_string(),
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "member.created", "member", member_id, details);

    let created = member::find_by_id(&conn, ctx.choir_id, member_id)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(ApiMemberResponse::from(created)))
}

/// PUT /api/v1/members/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiMemberUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_one_of(&body.role, "Role", ROLES));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    member::update(
        &conn,
        ctx.choir_id,
        member_id,
        &body.role,
        body.membership_type_id,
        body.voice_group_id,
        body.voice_type_id,
    )?;

    let details = serde_json::json!({
        "role": body.role,
        "voice_group_id": body.voice_group_id,
        "voice_type_id": body.voice_type_id,
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "member.updated", "member", member_id, details);

    let updated = member::find_by_id(&conn, ctx.choir_id, member_id)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiMemberResponse::from(updated)))
}

/// DELETE /api/v1/members/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;
    member::delete(&conn, ctx.choir_id, member_id)?;

    let details = serde_json::json!({ "summary": "Member deleted" });
    let _ = crate::audit::log(&conn, ctx.user_id, "member.deleted", "member", member_id, details);

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/members/{id}/periods
pub async fn list_periods(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;
    let periods = membership::find_periods(&conn, member_id)?
        .into_iter()
        .map(ApiPeriodResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(periods))
}

/// POST /api/v1/members/{id}/end — close the open period, ending the
/// membership. The member row and its history stay.
pub async fn end_membership(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiEndMembershipRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;

    let end_date = match &body.end_date {
        Some(s) => validate::parse_date(s, "end_date").map_err(|e| AppError::Validation(vec![e]))?,
        None => Utc::now().date_naive(),
    };

    let closed = membership::close_open_period(&conn, member_id, end_date, &body.end_reason)?;
    if !closed {
        return Err(AppError::Validation(vec![
            "Member has no open membership period".to_string(),
        ]));
    }

    let details = serde_json::json!({
        "end_date": end_date.to_string(),
        "end_reason": body.end_reason,
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "member.ended", "member", member_id, details);

    let updated = member::find_by_id(&conn, ctx.choir_id, member_id)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiMemberResponse::from(updated)))
}

/// POST /api/v1/members/{id}/reactivate — open a new period for a previously
/// ended membership.
pub async fn reactivate(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiReactivateRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;

    if membership::find_open_period(&conn, member_id)?.is_some() {
        return Err(AppError::Validation(vec![
            "Member already has an open membership period".to_string(),
        ]));
    }

    let start_date = match &body.start_date {
        Some(s) => validate::parse_date(s, "start_date").map_err(|e| AppError::Validation(vec![e]))?,
        None => Utc::now().date_naive(),
    };
    membership::open_period(&conn, member_id, start_date)?;

    let details = serde_json::json!({ "start_date": start_date.to_string() });
    let _ = crate::audit::log(&conn, ctx.user_id, "member.reactivated", "member", member_id, details);

    let updated = member::find_by_id(&conn, ctx.choir_id, member_id)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiMemberResponse::from(updated)))
}

/// GET /api/v1/members/{id}/leaves
pub async fn list_leaves(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let member_id = path.into_inner();

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;
    let leaves = membership::find_leaves(&conn, member_id)?
        .into_iter()
        .map(ApiLeaveResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(leaves))
}

/// POST /api/v1/members/{id}/leaves — members request their own leave;
/// organizers may file one for anyone.
pub async fn request_leave(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiLeaveRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_member(&session, &conn)?;
    let member_id = path.into_inner();

    if member_id != ctx.member_id && !ctx.is_organizer() {
        return Err(AppError::PermissionDenied("admin or conductor".to_string()));
    }

    member::find_by_id(&conn, ctx.choir_id, member_id)?.ok_or(AppError::NotFound)?;

    let start = validate::parse_date(&body.start_date, "start_date")
        .map_err(|e| AppError::Validation(vec![e]))?;
    let end = validate::parse_date(&body.end_date, "end_date")
        .map_err(|e| AppError::Validation(vec![e]))?;
    if end < start {
        return Err(AppError::Validation(vec![
            "end_date must not precede start_date".to_string(),
        ]));
    }

    let leave_id = membership::request_leave(&conn, member_id, start, end, &body.reason)?;

    let details = serde_json::json!({
        "start_date": start.to_string(),
        "end_date": end.to_string(),
    });
    let _ = crate::audit::log(&conn, ctx.user_id, "leave.requested", "leave", leave_id, details);

    let leave = membership::find_leave_by_id(&conn, leave_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(ApiLeaveResponse::from(leave)))
}

/// PUT /api/v1/leaves/{id}/status — approve or reject (organizer only).
pub async fn set_leave_status(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiLeaveStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = session::require_organizer(&session, &conn)?;
    let leave_id = path.into_inner();

    if let Some(err) = validate::validate_one_of(&body.status, "Status", &["approved", "rejected"]) {
        return Err(AppError::Validation(vec![err]));
    }

    let leave = membership::find_leave_by_id(&conn, leave_id)?.ok_or(AppError::NotFound)?;
    // The leave must belong to a member of the caller's choir.
    member::find_by_id(&conn, ctx.choir_id, leave.member_id)?.ok_or(AppError::NotFound)?;

    membership::set_leave_status(&conn, leave_id, &body.status)?;

    let details = serde_json::json!({ "status": body.status });
    let _ = crate::audit::log(&conn, ctx.user_id, "leave.status_set", "leave", leave_id, details);

    let updated = membership::find_leave_by_id(&conn, leave_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(ApiLeaveResponse::from(updated)))
}
