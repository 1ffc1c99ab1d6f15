use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::registry::{RegistryClient, RegistryError};

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::InvalidNumber(msg) => AppError::Validation(vec![msg]),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// GET /api/v1/registry/organizations/{orgnr}
pub async fn lookup(
    pool: web::Data<DbPool>,
    client: web::Data<RegistryClient>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    {
        let conn = pool.get()?;
        session::require_member(&session, &conn)?;
    }

    let org = client.lookup(&path.into_inner()).await?;
    match org {
        Some(org) => Ok(HttpResponse::Ok().json(org)),
        None => Err(AppError::NotFound),
    }
}

/// GET /api/v1/registry/organizations?name=…
pub async fn search(
    pool: web::Data<DbPool>,
    client: web::Data<RegistryClient>,
    session: Session,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    {
        let conn = pool.get()?;
        session::require_member(&session, &conn)?;
    }

    let name = query.get("name").map(String::as_str).unwrap_or("").trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation(vec![
            "Query parameter 'name' is required".to_string(),
        ]));
    }

    let organizations = client.search(&name).await?;
    Ok(HttpResponse::Ok().json(organizations))
}
