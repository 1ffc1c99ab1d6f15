use serde::{Deserialize, Serialize};

use crate::models::attendance::{AttendanceRow, AttendanceSummary};
use crate::models::choir::Choir;
use crate::models::event::Event;
use crate::models::list_of_value::ListOfValue;
use crate::models::member::MemberDisplay;
use crate::models::membership::{MembershipLeave, MembershipPeriod};

/// API error response: `{error, details?}`.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiMembershipInfo {
    pub choir_id: i64,
    pub choir_name: String,
    pub member_id: i64,
    pub role: String,
}

#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub active_choir_id: Option<i64>,
    pub memberships: Vec<ApiMembershipInfo>,
}

#[derive(Deserialize, Debug)]
pub struct SelectChoirRequest {
    pub choir_id: i64,
}

// ── Members ─────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone)]
pub struct ApiMemberResponse {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub membership_type_id: Option<i64>,
    pub membership_type: String,
    pub voice_group_id: Option<i64>,
    pub voice_group: String,
    pub voice_type_id: Option<i64>,
    pub voice_type: String,
    pub status: String,
    pub active_since: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MemberDisplay> for ApiMemberResponse {
    fn from(m: MemberDisplay) -> Self {
        ApiMemberResponse {
            id: m.id,
            user_id: m.user_id,
            username: m.username,
            email: m.email,
            display_name: m.display_name,
            role: m.role,
            membership_type_id: m.membership_type_id,
            membership_type: m.membership_type,
            voice_group_id: m.voice_group_id,
            voice_group: m.voice_group,
            voice_type_id: m.voice_type_id,
            voice_type: m.voice_type,
            status: m.status,
            active_since: m.active_since,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Create member request: link an existing user by id, or provide email (+
/// optional display name) for a new account with a generated password.
#[derive(Deserialize, Debug)]
pub struct ApiMemberCreateRequest {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default = "default_member_role")]
    pub role: String,
    pub membership_type_id: Option<i64>,
    pub voice_group_id: Option<i64>,
    pub voice_type_id: Option<i64>,
    pub start_date: Option<String>,
}

fn default_member_role() -> String {
    "member".to_string()
}

#[derive(Deserialize, Debug)]
pub struct ApiMemberUpdateRequest {
    pub role: String,
    pub membership_type_id: Option<i64>,
    pub voice_group_id: Option<i64>,
    pub voice_type_id: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct ApiEndMembershipRequest {
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_reason: String,
}

#[derive(Deserialize, Debug)]
pub struct ApiReactivateRequest {
    pub start_date: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiPeriodResponse {
    pub id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub end_reason: String,
}

impl From<MembershipPeriod> for ApiPeriodResponse {
    fn from(p: MembershipPeriod) -> Self {
        ApiPeriodResponse {
            id: p.id,
            start_date: p.start_date,
            end_date: p.end_date,
            end_reason: p.end_reason,
        }
    }
}

// ── Leaves ──────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct ApiLeaveRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize, Debug)]
pub struct ApiLeaveStatusRequest {
    pub status: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiLeaveResponse {
    pub id: i64,
    pub member_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub reason: String,
    pub created_at: String,
}

impl From<MembershipLeave> for ApiLeaveResponse {
    fn from(l: MembershipLeave) -> Self {
        ApiLeaveResponse {
            id: l.id,
            member_id: l.member_id,
            start_date: l.start_date,
            end_date: l.end_date,
            status: l.status,
            reason: l.reason,
            created_at: l.created_at,
        }
    }
}

// ── Events ──────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct ApiRecurrenceRequest {
    pub frequency: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    pub end_type: String,
    pub count: Option<u32>,
    pub until: Option<String>,
    #[serde(default)]
    pub exclude_holidays: bool,
}

fn default_interval() -> u32 {
    1
}

#[derive(Deserialize, Debug)]
pub struct ApiEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub event_type_id: Option<i64>,
    pub attendance_mode: Option<String>,
    pub recurrence: Option<ApiRecurrenceRequest>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiEventResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: String,
    pub end_time: String,
    pub event_type_id: Option<i64>,
    pub event_type: String,
    pub attendance_mode: String,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub parent_event_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Event> for ApiEventResponse {
    fn from(e: Event) -> Self {
        ApiEventResponse {
            id: e.id,
            title: e.title,
            description: e.description,
            location: e.location,
            start_time: e.start_time,
            end_time: e.end_time,
            event_type_id: e.event_type_id,
            event_type: e.event_type,
            attendance_mode: e.attendance_mode,
            is_recurring: e.is_recurring,
            recurrence_rule: e.recurrence_rule,
            parent_event_id: e.parent_event_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ApiEventDetailResponse {
    #[serde(flatten)]
    pub event: ApiEventResponse,
    pub attendance: AttendanceSummary,
}

#[derive(Serialize, Debug)]
pub struct ApiRecurringCreateResponse {
    pub parent: ApiEventResponse,
    pub instance_count: usize,
    pub instance_ids: Vec<i64>,
}

// ── Attendance ──────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct ApiIntentRequest {
    pub intended_status: String,
}

#[derive(Deserialize, Debug)]
pub struct ApiActualRequest {
    pub member_id: i64,
    pub actual_status: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiAttendanceRowResponse {
    pub member_id: i64,
    pub member_name: String,
    pub intended_status: String,
    pub actual_status: Option<String>,
    pub updated_at: String,
}

impl From<AttendanceRow> for ApiAttendanceRowResponse {
    fn from(a: AttendanceRow) -> Self {
        ApiAttendanceRowResponse {
            member_id: a.member_id,
            member_name: a.member_name,
            intended_status: a.intended_status,
            actual_status: a.actual_status,
            updated_at: a.updated_at,
        }
    }
}

// ── Taxonomy ────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct ApiLovRequest {
    pub category: String,
    pub value: Option<String>,
    pub display_name: String,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiLovResponse {
    pub id: i64,
    pub category: String,
    pub value: String,
    pub display_name: String,
    pub parent_id: Option<i64>,
    pub sort_order: i64,
    pub is_active: bool,
}

impl From<ListOfValue> for ApiLovResponse {
    fn from(v: ListOfValue) -> Self {
        ApiLovResponse {
            id: v.id,
            category: v.category,
            value: v.value,
            display_name: v.display_name,
            parent_id: v.parent_id,
            sort_order: v.sort_order,
            is_active: v.is_active,
        }
    }
}

// ── Choir settings ──────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ApiChoirResponse {
    pub id: i64,
    pub name: String,
    pub attendance_mode: String,
    pub holiday_region: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Choir> for ApiChoirResponse {
    fn from(c: Choir) -> Self {
        ApiChoirResponse {
            id: c.id,
            name: c.name,
            attendance_mode: c.attendance_mode,
            holiday_region: c.holiday_region,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ApiChoirSettingsRequest {
    pub name: String,
    pub attendance_mode: String,
    #[serde(default)]
    pub holiday_region: String,
}
