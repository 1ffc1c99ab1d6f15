use chrono::NaiveDateTime;

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
}

/// Event row with joined event-type display name. A recurring parent carries
/// the serialized rule; generated instances point back via parent_event_id and
/// are otherwise ordinary events.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub choir_id: i64,
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

pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub event_type_id: Option<i64>,
    pub attendance_mode: String,
}
