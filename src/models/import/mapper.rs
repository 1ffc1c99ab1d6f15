//! Heuristic normalization of free-text voice labels from spreadsheet imports.
//!
//! Source sheets spell the same voice group a dozen ways ("Sopran", "SOPRAN",
//! "S", "1. sopran", "Sopran 1"). Matching is case-insensitive and ordered:
//! keyword containment wins over single-letter equality. Unmatched values pass
//! through unchanged so the caller can treat them as would-create-new.

use std::collections::HashMap;

/// (keyword, single-letter abbreviation, canonical display name)
const VOICE_GROUPS: &[(&str, &str, &str)] = &[
    ("sopran", "s", "Sopran"),
    ("alt", "a", "Alt"),
    ("tenor", "t", "Tenor"),
    ("bass", "b", "Bass"),
];

/// Map a raw voice-group label to its canonical display name.
/// Keyword containment is checked before abbreviation equality, so "S" maps
/// via the abbreviation while "Sopran 1" maps via the keyword.
pub fn map_voice_group(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    for (keyword, _, canonical) in VOICE_GROUPS {
        if lower.contains(keyword) {
            return Some(canonical);
        }
    }
    for (_, letter, canonical) in VOICE_GROUPS {
        if lower == *letter {
            return Some(canonical);
        }
    }
    None
}

/// Map a raw voice-type label to `"{n}. {Group}"`. Requires both a group
/// keyword and a "1"/"2" token, in either order ("1. sopran", "Sopran 1").
pub fn map_voice_type(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    let (_, _, canonical) = VOICE_GROUPS
        .iter()
        .find(|(keyword, _, _)| lower.contains(keyword))?;
    let digit = lower.chars().find(|c| *c == '1' || *c == '2')?;
    Some(format!("{digit}. {canonical}"))
}

/// Build a raw → canonical mapping for a set of raw labels. Raw values with no
/// heuristic match get no entry, which signals "would create a new taxonomy
/// row" to the caller.
pub fn build_mapping<'a, I>(category: &str, raws: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mapping = HashMap::new();
    for raw in raws {
        let mapped = match category {
            "voice_type" => map_voice_type(raw),
            _ => map_voice_group(raw).map(String::from),
        };
        if let Some(canonical) = mapped {
            mapping.insert(raw.to_string(), canonical);
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_keyword_containment_is_case_insensitive() {
        assert_eq!(map_voice_group("Sopran"), Some("Sopran"));
        assert_eq!(map_voice_group("SOPRAN"), Some("Sopran"));
        assert_eq!(map_voice_group("  sopran 2 "), Some("Sopran"));
        assert_eq!(map_voice_group("Altos"), Some("Alt"));
        assert_eq!(map_voice_group("TENOR"), Some("Tenor"));
    }

    #[test]
    fn single_letter_abbreviations_match_on_equality_only() {
        assert_eq!(map_voice_group("S"), Some("Sopran"));
        assert_eq!(map_voice_group("a"), Some("Alt"));
        assert_eq!(map_voice_group("T"), Some("Tenor"));
        assert_eq!(map_voice_group("b"), Some("Bass"));
        // "x" equals no abbreviation and contains no keyword
        assert_eq!(map_voice_group("x"), None);
    }

    #[test]
    fn unmatched_values_produce_no_mapping() {
        assert_eq!(map_voice_group("Dirigent"), None);
        assert_eq!(map_voice_group(""), None);
        let mapping = build_mapping("voice_group", ["Dirigent", "Sopran"]);
        assert!(!mapping.contains_key("Dirigent"));
        assert_eq!(mapping.get("Sopran").map(String::as_str), Some("Sopran"));
    }

    #[test]
    fn voice_type_accepts_number_on_either_side() {
        assert_eq!(map_voice_type("1. sopran").as_deref(), Some("1. Sopran"));
        assert_eq!(map_voice_type("Sopran 1").as_deref(), Some("1. Sopran"));
        assert_eq!(map_voice_type("2. Alt").as_deref(), Some("2. Alt"));
        assert_eq!(map_voice_type("bass 2").as_deref(), Some("2. Bass"));
    }

    #[test]
    fn voice_type_requires_both_number_and_group() {
        assert_eq!(map_voice_type("Sopran"), None);
        assert_eq!(map_voice_type("1."), None);
        assert_eq!(map_voice_type("gruppe 1"), None);
    }
}
