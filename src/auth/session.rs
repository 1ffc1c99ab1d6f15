use actix_session::Session;
use rusqlite::Connection;

use crate::errors::AppError;
use crate::models::member;

/// The caller's resolved tenant scope for one request. Always derived from the
/// session user's own membership row — never from a client-supplied choir id.
#[derive(Debug, Clone)]
pub struct MemberContext {
    pub user_id: i64,
    pub member_id: i64,
    pub choir_id: i64,
    pub role: String,
}

impl MemberContext {
    pub fn is_organizer(&self) -> bool {
        self.role == "admin" || self.role == "conductor"
    }
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

/// The choir the user selected for this session, if any. Users with a single
/// membership never need to set it.
pub fn get_active_choir(session: &Session) -> Option<i64> {
    session.get::<i64>("choir_id").unwrap_or(None)
}

pub fn require_user(session: &Session) -> Result<i64, AppError> {
    get_user_id(session).ok_or(AppError::Unauthorized)
}

/// Resolve the caller's membership row: session user + (optional) selected
/// choir. No membership at all is a 403, not a 404.
pub fn require_member(session: &Session, conn: &Connection) -> Result<MemberContext, AppError> {
    let user_id = require_user(session)?;
    let membership = member::find_membership(conn, user_id, get_active_choir(session))?
        .ok_or(AppError::NoMembership)?;
    Ok(MemberContext {
        user_id,
        member_id: membership.id,
        choir_id: membership.choir_id,
        role: membership.role,
    })
}

/// Organizer gate for admin/conductor-only operations.
pub fn require_organizer(session: &Session, conn: &Connection) -> Result<MemberContext, AppError> {
    let ctx = require_member(session, conn)?;
    if ctx.is_organizer() {
        Ok(ctx)
    } else {
        Err(AppError::PermissionDenied("admin or conductor".to_string()))
    }
}
