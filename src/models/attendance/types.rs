use serde::Serialize;

pub const INTENDED_STATUSES: &[&str] = &["attending", "not_attending", "tentative", "not_responded"];
pub const ACTUAL_STATUSES: &[&str] = &["present", "absent", "late"];

/// One row per (event, member): the member's intent plus the outcome an
/// organizer recorded afterwards.
#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub id: i64,
    pub event_id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub intended_status: String,
    pub actual_status: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub total: i64,
    pub attending: i64,
    pub not_attending: i64,
    pub tentative: i64,
    pub not_responded: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

/// Merge attendance rows into summary counts.
///
/// For opt-out events, members who have not responded count as attending; for
/// opt-in events they do not. Actual tallies only count explicitly recorded
/// outcomes — a NULL actual_status lands in no bucket.
pub fn summarize(rows: &[AttendanceRow], attendance_mode: &str) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        total: rows.len() as i64,
        ..Default::default()
    };

    for row in rows {
        match row.intended_status.as_str() {
            "attending" => summary.attending += 1,
            "not_attending" => summary.not_attending += 1,
            "tentative" => summary.tentative += 1,
            _ => summary.not_responded += 1,
        }
        match row.actual_status.as_deref() {
            Some("present") => summary.present += 1,
            Some("absent") => summary.absent += 1,
            Some("late") => summary.late += 1,
            _ => {}
        }
    }

    if attendance_mode == "opt_out" {
        summary.attending += summary.not_responded;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(intended: &str, actual: Option<&str>) -> AttendanceRow {
        AttendanceRow {
            id: 0,
            event_id: 1,
            member_id: 1,
            member_name: String::new(),
            intended_status: intended.to_string(),
            actual_status: actual.map(String::from),
            updated_at: String::new(),
        }
    }

    fn ten_invitees() -> Vec<AttendanceRow> {
        let mut rows = Vec::new();
        for _ in 0..3 {
            rows.push(row("attending", None));
        }
        for _ in 0..2 {
            rows.push(row("not_attending", None));
        }
        for _ in 0..5 {
            rows.push(row("not_responded", None));
        }
        rows
    }

    #[test]
    fn opt_out_counts_non_responders_as_attending() {
        let summary = summarize(&ten_invitees(), "opt_out");
        assert_eq!(summary.total, 10);
        assert_eq!(summary.attending, 8);
        assert_eq!(summary.not_attending, 2);
        assert_eq!(summary.not_responded, 5);
    }

    #[test]
    fn opt_in_leaves_non_responders_uncounted() {
        let summary = summarize(&ten_invitees(), "opt_in");
        assert_eq!(summary.attending, 3);
        assert_eq!(summary.not_attending, 2);
        assert_eq!(summary.tentative, 0);
        assert_eq!(summary.not_responded, 5);
    }

    #[test]
    fn actual_tallies_are_independent_of_intent() {
        let rows = vec![
            row("attending", Some("present")),
            row("attending", Some("late")),
            row("not_attending", Some("present")),
            row("not_responded", Some("absent")),
            row("tentative", None),
        ];
        let summary = summarize(&rows, "opt_in");
        assert_eq!(summary.present, 2);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.tentative, 1);
    }

    #[test]
    fn empty_event_summarizes_to_zeroes() {
        let summary = summarize(&[], "opt_out");
        assert_eq!(summary, AttendanceSummary::default());
    }
}
