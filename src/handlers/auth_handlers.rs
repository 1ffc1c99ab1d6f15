use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_types::{ApiErrorResponse, ApiMembershipInfo, LoginRequest, MeResponse, SelectChoirRequest};
use crate::auth::{password, session};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{member, user};

fn me_response(
    conn: &rusqlite::Connection,
    session: &Session,
    u: user::User,
) -> Result<MeResponse, AppError> {
    let memberships = member::find_memberships_for_user(conn, u.id)?
        .into_iter()
        .map(|(choir_id, choir_name, member_id, role)| ApiMembershipInfo {
            choir_id,
            choir_name,
            member_id,
            role,
        })
        .collect();
    Ok(MeResponse {
        user_id: u.id,
        username: u.username,
        email: u.email,
        display_name: u.display_name,
        active_choir_id: session::get_active_choir(session),
        memberships,
    })
}

/// POST /api/v1/auth/login
pub async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;

    // Accept username or email in the same field.
    let found = match user::find_by_username(&conn, body.username.trim())? {
        Some(u) => Some(u),
        None => user::find_by_email(&conn, body.username.trim())?,
    };

    let Some(u) = found else {
        return Ok(HttpResponse::Unauthorized().json(ApiErrorResponse {
            error: "Invalid username or password".to_string(),
            details: None,
        }));
    };

    let ok = password::verify_password(&body.password, &u.password)
        .map_err(AppError::Hash)?;
    if !ok {
        return Ok(HttpResponse::Unauthorized().json(ApiErrorResponse {
            error: "Invalid username or password".to_string(),
            details: None,
        }));
    }

    session.renew();
    session
        .insert("user_id", u.id)
        .map_err(|e| AppError::Session(e.to_string()))?;
    session
        .insert("username", u.username.clone())
        .map_err(|e| AppError::Session(e.to_string()))?;
    session.remove("choir_id");

    log::info!("User {} logged in", u.username);
    let response = me_response(&conn, &session, u)?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/auth/logout
pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/auth/me
pub async fn me(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = session::require_user(&session)?;
    let conn = pool.get()?;
    let u = user::find_by_id(&conn, user_id)?.ok_or(AppError::Unauthorized)?;
    let response = me_response(&conn, &session, u)?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/auth/choir — select the active choir for users with more than
/// one membership. The selection must be one of the caller's own memberships.
pub async fn select_choir(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<SelectChoirRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = session::require_user(&session)?;
    let conn = pool.get()?;

    member::find_membership(&conn, user_id, Some(body.choir_id))?
        .ok_or(AppError::NoMembership)?;

    session
        .insert("choir_id", body.choir_id)
        .map_err(|e| AppError::Session(e.to_string()))?;
    Ok(HttpResponse::NoContent().finish())
}
