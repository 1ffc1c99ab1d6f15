use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Hard cap on generated occurrences, guarding against malformed rules
/// (e.g. an `until` date decades out).
pub const MAX_OCCURRENCES: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// End condition: a fixed number of occurrences, or a final calendar date
/// (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceEnd {
    Count(u32),
    Until(NaiveDate),
}

/// Recurrence rule, serialized as JSON onto the parent event row only.
/// Editing a stored rule never rewrites instances that already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub end: RecurrenceEnd,
    #[serde(default)]
    pub exclude_holidays: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

fn advance(start: NaiveDateTime, frequency: Frequency, steps: u32) -> Option<NaiveDateTime> {
    match frequency {
        Frequency::Daily => start.checked_add_signed(Duration::days(steps as i64)),
        Frequency::Weekly => start.checked_add_signed(Duration::weeks(steps as i64)),
        Frequency::Monthly => start.checked_add_months(Months::new(steps)),
    }
}

/// Expand a rule into concrete occurrence start/end pairs, each preserving the
/// original duration.
///
/// Holiday exclusion compares calendar dates, not timestamps, and removes the
/// slot entirely — the schedule never shifts forward to the next free day.
/// With a count end condition the holiday-skipped slots still consume the
/// count, so the output can be shorter than requested.
///
/// An `until` date before `start` produces an empty schedule; that is not an
/// error.
pub fn expand(
    rule: &RecurrenceRule,
    start: NaiveDateTime,
    end: NaiveDateTime,
    holidays: &HashSet<NaiveDate>,
) -> Vec<Occurrence> {
    let interval = rule.interval.max(1);
    let duration = end - start;

    let slots = match rule.end {
        RecurrenceEnd::Count(n) => (n as usize).min(MAX_OCCURRENCES),
        RecurrenceEnd::Until(_) => MAX_OCCURRENCES,
    };

    let mut occurrences = Vec::new();
    for slot in 0..slots {
        let steps = match (slot as u32).checked_mul(interval) {
            Some(s) => s,
            None => break,
        };
        let occ_start = match advance(start, rule.frequency, steps) {
            Some(dt) => dt,
            None => break,
        };

        if let RecurrenceEnd::Until(until) = rule.end {
            if occ_start.date() > until {
                break;
            }
        }

        if rule.exclude_holidays && holidays.contains(&occ_start.date()) {
            continue;
        }

        occurrences.push(Occurrence {
            start: occ_start,
            end: occ_start + duration,
        });
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn weekly_count_generates_requested_occurrences() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 1,
            end: RecurrenceEnd::Count(4),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-05T19:00:00"), dt("2026-01-05T21:00:00"), &HashSet::new());
        assert_eq!(occs.len(), 4);
        assert_eq!(occs[0].start, dt("2026-01-05T19:00:00"));
        assert_eq!(occs[1].start, dt("2026-01-12T19:00:00"));
        assert_eq!(occs[3].start, dt("2026-01-26T19:00:00"));
        // Duration preserved on every occurrence
        for occ in &occs {
            assert_eq!(occ.end - occ.start, Duration::hours(2));
        }
    }

    #[test]
    fn holiday_slot_is_skipped_not_shifted() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 1,
            end: RecurrenceEnd::Count(4),
            exclude_holidays: true,
        };
        let mut holidays = HashSet::new();
        holidays.insert(date("2026-01-12"));
        let occs = expand(&rule, dt("2026-01-05T19:00:00"), dt("2026-01-05T21:00:00"), &holidays);
        // min(count, 365) minus the holiday hit
        assert_eq!(occs.len(), 3);
        assert_eq!(occs[0].start, dt("2026-01-05T19:00:00"));
        // Jan 12 is simply absent; Jan 19 keeps its own slot
        assert_eq!(occs[1].start, dt("2026-01-19T19:00:00"));
        assert_eq!(occs[2].start, dt("2026-01-26T19:00:00"));
    }

    #[test]
    fn holidays_ignored_when_exclusion_disabled() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 1,
            end: RecurrenceEnd::Count(3),
            exclude_holidays: false,
        };
        let mut holidays = HashSet::new();
        holidays.insert(date("2026-01-12"));
        let occs = expand(&rule, dt("2026-01-05T19:00:00"), dt("2026-01-05T21:00:00"), &holidays);
        assert_eq!(occs.len(), 3);
    }

    #[test]
    fn until_before_start_yields_empty_schedule() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 1,
            end: RecurrenceEnd::Until(date("2025-12-01")),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-05T19:00:00"), dt("2026-01-05T21:00:00"), &HashSet::new());
        assert!(occs.is_empty());
    }

    #[test]
    fn until_is_inclusive() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 1,
            end: RecurrenceEnd::Until(date("2026-01-19")),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-05T19:00:00"), dt("2026-01-05T21:00:00"), &HashSet::new());
        assert_eq!(occs.len(), 3);
        assert_eq!(occs[2].start.date(), date("2026-01-19"));
    }

    #[test]
    fn count_is_capped_at_max() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 1,
            end: RecurrenceEnd::Count(10_000),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-01T10:00:00"), dt("2026-01-01T11:00:00"), &HashSet::new());
        assert_eq!(occs.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn until_far_future_is_capped_at_max() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 1,
            end: RecurrenceEnd::Until(date("2999-01-01")),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-01T10:00:00"), dt("2026-01-01T11:00:00"), &HashSet::new());
        assert_eq!(occs.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn monthly_interval_respects_step() {
        let rule = RecurrenceRule {
            frequency: Frequency::Monthly,
            interval: 2,
            end: RecurrenceEnd::Count(3),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-15T18:00:00"), dt("2026-01-15T20:00:00"), &HashSet::new());
        assert_eq!(occs.len(), 3);
        assert_eq!(occs[1].start, dt("2026-03-15T18:00:00"));
        assert_eq!(occs[2].start, dt("2026-05-15T18:00:00"));
    }

    #[test]
    fn zero_interval_is_normalized_to_one() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 0,
            end: RecurrenceEnd::Count(2),
            exclude_holidays: false,
        };
        let occs = expand(&rule, dt("2026-01-01T10:00:00"), dt("2026-01-01T11:00:00"), &HashSet::new());
        assert_eq!(occs.len(), 2);
        assert_eq!(occs[1].start, dt("2026-01-02T10:00:00"));
    }

    #[test]
    fn rule_json_round_trip() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            interval: 2,
            end: RecurrenceEnd::Until(date("2026-06-30")),
            exclude_holidays: true,
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: RecurrenceRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frequency, Frequency::Weekly);
        assert_eq!(back.interval, 2);
        assert_eq!(back.end, RecurrenceEnd::Until(date("2026-06-30")));
        assert!(back.exclude_holidays);
    }
}
