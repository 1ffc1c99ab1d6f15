use serde::{Deserialize, Serialize};

/// One spreadsheet row from a member import. Taxonomy columns are free text;
/// the mapper normalizes them before resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberImportRow {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub membership_type: String,
    #[serde(default)]
    pub voice_group: String,
    #[serde(default)]
    pub voice_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPayload {
    #[serde(default)]
    pub rows: Vec<MemberImportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: usize,
    pub email: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}
