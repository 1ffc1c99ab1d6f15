/// Raw member row linking an auth account to a choir.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: i64,
    pub choir_id: i64,
    pub user_id: i64,
    pub role: String,
    pub membership_type_id: Option<i64>,
    pub voice_group_id: Option<i64>,
    pub voice_type_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Member for listing/detail: joined profile, taxonomy display names, and the
/// lifecycle status computed from periods and leaves.
///
/// `status` is one of `active`, `on_leave`, `inactive`. A member is active iff
/// an open membership period exists; an approved, date-current leave turns the
/// displayed status into `on_leave`. No flag column is consulted.
#[derive(Debug, Clone)]
pub struct MemberDisplay {
    pub id: i64,
    pub choir_id: i64,
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

pub struct MemberPage {
    pub members: Vec<MemberDisplay>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

pub struct NewMember {
    pub user_id: i64,
    pub role: String,
    pub membership_type_id: Option<i64>,
    pub voice_group_id: Option<i64>,
    pub voice_type_id: Option<i64>,
}
