//! Business and Result Records
//!
//! `BusinessRecord` is the immutable input shape shared by the registry
//! client and file input. `EnrichedRecord` is what one processed business
//! comes back as: the input fields plus website/contact data and a
//! provenance tag saying which path produced them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One business as supplied by the registry search or an input file.
///
/// Only the name is required. The serde aliases accept the French field
/// names used by the data files this tool historically consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    #[serde(default, alias = "adresse", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, alias = "code_postal", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, alias = "ville", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, alias = "activite", skip_serializing_if = "Option::is_none")]
    pub activity_code: Option<String>,
}

impl BusinessRecord {
    /// Record carrying only a name; the usual starting point in tests and
    /// for name-only input files.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Stable identity: the registry identifier when present, else the name.
    pub fn identity(&self) -> &str {
        self.siret.as_deref().unwrap_or(&self.name)
    }
}

/// Which subsystem produced a record's website and contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMethod {
    /// External places lookup answered authoritatively.
    Places,
    /// Domain guessing and probing, used when places is unavailable or
    /// inconclusive.
    Fallback,
    /// The batch runner caught a task-level failure; the record carries the
    /// detail and no website data.
    Error,
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMethod::Places => write!(f, "places"),
            SourceMethod::Fallback => write!(f, "fallback"),
            SourceMethod::Error => write!(f, "error"),
        }
    }
}

/// One fully processed business.
///
/// `has_website` always agrees with `website_url` being present; the
/// constructors are the only places that set the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub business: BusinessRecord,
    pub has_website: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    pub source_method: SourceMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl EnrichedRecord {
    fn base(business: BusinessRecord, website_url: Option<String>, source: SourceMethod) -> Self {
        Self {
            business,
            has_website: website_url.is_some(),
            website_url,
            phone: None,
            rating: None,
            review_count: 0,
            opening_hours: Vec::new(),
            source_method: source,
            error_detail: None,
        }
    }

    /// Result of the domain-guessing fallback path.
    pub fn via_fallback(business: BusinessRecord, website_url: Option<String>) -> Self {
        Self::base(business, website_url, SourceMethod::Fallback)
    }

    /// Result of a successful places details lookup. Contact fields start
    /// empty; the enricher fills them from the details payload.
    pub fn via_places(business: BusinessRecord, website_url: Option<String>) -> Self {
        Self::base(business, website_url, SourceMethod::Places)
    }

    /// Degraded record for a task the batch runner had to catch.
    pub fn via_error(business: BusinessRecord, detail: impl Into<String>) -> Self {
        let mut record = Self::base(business, None, SourceMethod::Error);
        record.error_detail = Some(detail.into());
        record
    }

    /// Attach a failure detail without changing the provenance tag.
    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_siret() {
        let mut record = BusinessRecord::named("Boulangerie Dupont");
        assert_eq!(record.identity(), "Boulangerie Dupont");

        record.siret = Some("12345678900012".to_string());
        assert_eq!(record.identity(), "12345678900012");
    }

    #[test]
    fn test_constructors_keep_has_website_consistent() {
        let hit = EnrichedRecord::via_fallback(
            BusinessRecord::named("A"),
            Some("https://a.fr".to_string()),
        );
        assert!(hit.has_website);
        assert_eq!(hit.source_method, SourceMethod::Fallback);

        let miss = EnrichedRecord::via_fallback(BusinessRecord::named("B"), None);
        assert!(!miss.has_website);
        assert!(miss.website_url.is_none());

        let failed = EnrichedRecord::via_error(BusinessRecord::named("C"), "boom");
        assert!(!failed.has_website);
        assert_eq!(failed.source_method, SourceMethod::Error);
        assert_eq!(failed.error_detail.as_deref(), Some("boom"));
    }

    #[test]
    fn test_source_method_serializes_lowercase() {
        let record = EnrichedRecord::via_places(
            BusinessRecord::named("Chez Momo"),
            Some("https://chezmomo.fr".to_string()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["source_method"], "places");
        assert_eq!(json["name"], "Chez Momo");
        assert_eq!(json["has_website"], true);
    }

    #[test]
    fn test_french_aliases_accepted_on_input() {
        let json = r#"{
            "nom": "Garage Martin",
            "ville": "Lyon",
            "code_postal": "69003",
            "adresse": "12 rue des Freres",
            "activite": "45.20A"
        }"#;
        let record: BusinessRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Garage Martin");
        assert_eq!(record.city.as_deref(), Some("Lyon"));
        assert_eq!(record.postal_code.as_deref(), Some("69003"));
        assert_eq!(record.activity_code.as_deref(), Some("45.20A"));
    }
}
