//! Enhetsregisteret (Norwegian business registry) client.
//!
//! Read-only: lookup by organization number and name search. A 404 from the
//! registry is a normal answer (the number is well-formed but unassigned) and
//! maps to `Ok(None)`, not an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::orgnr::validate_organization_number;

const DEFAULT_BASE_URL: &str = "https://data.brreg.no/enhetsregisteret/api";
const USER_AGENT: &str = "choirdinated/0.1.0";
const SEARCH_PAGE_SIZE: u32 = 20;

#[derive(Debug)]
pub enum RegistryError {
    InvalidNumber(String),
    Network(String),
    Api(u16, String),
    Parse(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidNumber(e) => write!(f, "Invalid organization number: {e}"),
            RegistryError::Network(e) => write!(f, "Network error: {e}"),
            RegistryError::Api(status, body) => write!(f, "Registry error {status}: {body}"),
            RegistryError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

// ── External schema (Enhetsregisteret) ──────────────────────────────

#[derive(Debug, Deserialize)]
struct BrregOrganisasjonsform {
    kode: Option<String>,
    beskrivelse: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrregAdresse {
    adresse: Option<Vec<String>>,
    postnummer: Option<String>,
    poststed: Option<String>,
    land: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrregNaeringskode {
    kode: Option<String>,
    beskrivelse: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrregEnhet {
    organisasjonsnummer: String,
    navn: String,
    organisasjonsform: Option<BrregOrganisasjonsform>,
    forretningsadresse: Option<BrregAdresse>,
    naeringskode1: Option<BrregNaeringskode>,
    antall_ansatte: Option<i64>,
    hjemmeside: Option<String>,
    registreringsdato_enhetsregisteret: Option<String>,
    konkurs: Option<bool>,
    under_avvikling: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct BrregEmbedded {
    enheter: Vec<BrregEnhet>,
}

#[derive(Debug, Deserialize)]
struct BrregSearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<BrregEmbedded>,
}

// ── Internal shape ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub organization_number: String,
    pub name: String,
    pub org_form_code: String,
    pub org_form_description: String,
    pub address_lines: Vec<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub industry_code: String,
    pub industry_description: String,
    pub employees: Option<i64>,
    pub website: String,
    pub registered_date: String,
    pub bankrupt: bool,
    pub under_liquidation: bool,
}

impl From<BrregEnhet> for Organization {
    fn from(e: BrregEnhet) -> Self {
        let form = e.organisasjonsform.unwrap_or(BrregOrganisasjonsform {
            kode: None,
            beskrivelse: None,
        });
        let address = e.forretningsadresse.unwrap_or(BrregAdresse {
            adresse: None,
            postnummer: None,
            poststed: None,
            land: None,
        });
        let industry = e.naeringskode1.unwrap_or(BrregNaeringskode {
            kode: None,
            beskrivelse: None,
        });
        Organization {
            organization_number: e.organisasjonsnummer,
            name: e.navn,
            org_form_code: form.kode.unwrap_or_default(),
            org_form_description: form.beskrivelse.unwrap_or_default(),
            address_lines: address.adresse.unwrap_or_default(),
            postal_code: address.postnummer.unwrap_or_default(),
            city: address.poststed.unwrap_or_default(),
            country: address.land.unwrap_or_default(),
            industry_code: industry.kode.unwrap_or_default(),
            industry_description: industry.beskrivelse.unwrap_or_default(),
            employees: e.antall_ansatte,
            website: e.hjemmeside.unwrap_or_default(),
            registered_date: e.registreringsdato_enhetsregisteret.unwrap_or_default(),
            bankrupt: e.konkurs.unwrap_or(false),
            under_liquidation: e.under_avvikling.unwrap_or(false),
        }
    }
}

pub struct RegistryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: Option<String>) -> Result<Self, RegistryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Base URL from `REGISTRY_BASE_URL`, falling back to the public registry.
    pub fn from_env() -> Result<Self, RegistryError> {
        Self::new(std::env::var("REGISTRY_BASE_URL").ok())
    }

    /// Lookup an organization by number. The number is checksum-validated
    /// before any network traffic; a registry 404 returns `Ok(None)`.
    pub async fn lookup(&self, raw_number: &str) -> Result<Option<Organization>, RegistryError> {
        let number = validate_organization_number(raw_number)
            .map_err(RegistryError::InvalidNumber)?;

        let url = format!("{}/enheter/{}", self.base_url, number);
        log::debug!("Registry lookup: {url}");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api(status.as_u16(), body));
        }

        let enhet: BrregEnhet = response
            .json()
            .await
            .map_err(|e| RegistryError::Parse(e.to_string()))?;
        Ok(Some(enhet.into()))
    }

    /// Search organizations by name.
    pub async fn search(&self, name: &str) -> Result<Vec<Organization>, RegistryError> {
        let url = format!("{}/enheter", self.base_url);
        log::debug!("Registry search: {url}?navn={name}");

        let response = self
            .http_client
            .get(&url)
            .query(&[("navn", name), ("size", &SEARCH_PAGE_SIZE.to_string())])
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api(status.as_u16(), body));
        }

        let parsed: BrregSearchResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Parse(e.to_string()))?;

        Ok(parsed
            .embedded
            .map(|e| e.enheter.into_iter().map(Organization::from).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_schema_maps_to_internal_shape() {
        let json = r#"{
            "organisasjonsnummer": "923609016",
            "navn": "EQUINOR ASA",
            "organisasjonsform": {"kode": "ASA", "beskrivelse": "Allmennaksjeselskap"},
            "forretningsadresse": {
                "adresse": ["Forusbeen 50"],
                "postnummer": "4035",
                "poststed": "STAVANGER",
                "land": "Norge"
            },
            "naeringskode1": {"kode": "06.100", "beskrivelse": "Utvinning av råolje"},
            "antallAnsatte": 21126,
            "registreringsdatoEnhetsregisteret": "1995-02-20",
            "konkurs": false,
            "underAvvikling": false
        }"#;
        let enhet: BrregEnhet = serde_json::from_str(json).unwrap();
        let org = Organization::from(enhet);
        assert_eq!(org.organization_number, "923609016");
        assert_eq!(org.name, "EQUINOR ASA");
        assert_eq!(org.org_form_code, "ASA");
        assert_eq!(org.address_lines, vec!["Forusbeen 50".to_string()]);
        assert_eq!(org.city, "STAVANGER");
        assert_eq!(org.employees, Some(21126));
        assert!(!org.bankrupt);
    }

    #[test]
    fn missing_optional_sections_default_cleanly() {
        let json = r#"{"organisasjonsnummer": "974760673", "navn": "TEST"}"#;
        let enhet: BrregEnhet = serde_json::from_str(json).unwrap();
        let org = Organization::from(enhet);
        assert_eq!(org.org_form_code, "");
        assert!(org.address_lines.is_empty());
        assert_eq!(org.employees, None);
        assert!(!org.under_liquidation);
    }

    #[test]
    fn lookup_rejects_invalid_number_before_any_request() {
        let client = RegistryClient::new(Some("http://registry.invalid".to_string())).unwrap();
        let result = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(client.lookup("123456789"));
        assert!(matches!(result, Err(RegistryError::InvalidNumber(_))));
    }
}
