use chrono::Utc;
use rusqlite::Connection;

use super::mapper;
use super::types::{ImportPayload, ImportResult, ImportRowError, MemberImportRow};
use crate::auth::password;
use crate::models::{list_of_value, member, membership, user};

/// Derive a free username from the email local part, suffixing a counter on
/// collision.
fn pick_username(conn: &Connection, email: &str) -> Result<String, String> {
    let local = email.split('@').next().unwrap_or(email);
    let base: String = local
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let base = if base.is_empty() { "member".to_string() } else { base };

    let mut candidate = base.clone();
    let mut counter = 1;
    while user::find_by_username(conn, &candidate)
        .map_err(|e| format!("DB error checking username: {e}"))?
        .is_some()
    {
        counter += 1;
        candidate = format!("{base}{counter}");
    }
    Ok(candidate)
}

/// Resolve a raw taxonomy label: heuristic mapping first, then a
/// case-insensitive lookup against value and display_name, creating the row
/// only when neither matches.
fn resolve_taxonomy(
    conn: &Connection,
    choir_id: i64,
    category: &str,
    raw: &str,
    parent_id: Option<i64>,
) -> Result<Option<i64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let canonical = match category {
        "voice_group" => mapper::map_voice_group(raw)
            .map(String::from)
            .unwrap_or_else(|| raw.to_string()),
        "voice_type" => mapper::map_voice_type(raw).unwrap_or_else(|| raw.to_string()),
        _ => raw.to_string(),
    };
    list_of_value::resolve_or_create(conn, choir_id, category, &canonical, parent_id)
        .map(Some)
        .map_err(|e| format!("taxonomy resolve failed for '{raw}': {e}"))
}

fn import_row(
    conn: &Connection,
    choir_id: i64,
    row: &MemberImportRow,
) -> Result<bool, String> {
    let email = row.email.trim();
    if email.is_empty() || !email.contains('@') || !email.contains('.') {
        return Err(format!("invalid email '{}'", row.email));
    }

    let existing_user = user::find_by_email(conn, email).map_err(|e| format!("DB error: {e}"))?;

    // Already a member of this choir: skip, don't touch.
    if let Some(ref u) = existing_user {
        let already = member::find_membership(conn, u.id, Some(choir_id))
            .map_err(|e| format!("DB error: {e}"))?;
        if already.is_some() {
            return Ok(false);
        }
    }

    let user_id = match existing_user {
        Some(u) => u.id,
        None => {
            let username = pick_username(conn, email)?;
            let temp_password = password::generate_password(12);
            let hash = password::hash_password(&temp_password)?;
            let display_name = format!("{} {}", row.first_name.trim(), row.last_name.trim())
                .trim()
                .to_string();
            user::create(
                conn,
                &user::NewUser {
                    username,
                    email: email.to_string(),
                    password: hash,
                    display_name,
                },
            )
            .map_err(|e| format!("user create failed: {e}"))?
        }
    };

    let voice_group_id = resolve_taxonomy(conn, choir_id, "voice_group", &row.voice_group, None)?;
    let voice_type_id =
        resolve_taxonomy(conn, choir_id, "voice_type", &row.voice_type, voice_group_id)?;
    let membership_type_id =
        resolve_taxonomy(conn, choir_id, "membership_type", &row.membership_type, None)?;

    let member_id = member::create(
        conn,
        choir_id,
        &member::NewMember {
            user_id,
            role: "member".to_string(),
            membership_type_id,
            voice_group_id,
            voice_type_id,
        },
    )
    .map_err(|e| format!("member create failed: {e}"))?;

    membership::open_period(conn, member_id, Utc::now().date_naive())
        .map_err(|e| format!("period open failed: {e}"))?;

    Ok(true)
}

/// Import spreadsheet rows as members. Returns created/skipped counts plus
/// per-row errors; a bad row never aborts the rest of the batch.
pub fn import_members(
    conn: &Connection,
    choir_id: i64,
    payload: &ImportPayload,
) -> ImportResult {
    let mut result = ImportResult::default();

    for (index, row) in payload.rows.iter().enumerate() {
        match import_row(conn, choir_id, row) {
            Ok(true) => result.created += 1,
            Ok(false) => result.skipped += 1,
            Err(reason) => result.errors.push(ImportRowError {
                row: index + 1,
                email: row.email.clone(),
                reason,
            }),
        }
    }

    result
}
