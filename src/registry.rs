//! Company Registry Client
//!
//! Client for the public Recherche Entreprises API (the SIRENE-backed
//! search at recherche-entreprises.api.gouv.fr). No credential needed.
//! Results map straight into [`BusinessRecord`]s, which is all the rest of
//! the pipeline wants from it.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::record::BusinessRecord;

pub const DEFAULT_BASE_URL: &str = "https://recherche-entreprises.api.gouv.fr/search";

/// The API refuses larger pages.
const MAX_PER_PAGE: usize = 25;

/// Errors returned by the registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Company-size filter for a registry search, mapped to the API's own
/// filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryFilter {
    /// Small and medium businesses (the API's PME category).
    Pme,
    /// Sole traders registered as craftsmen.
    Artisan,
    /// Very small businesses, 0-9 employees.
    Micro,
}

impl CategoryFilter {
    fn as_param(self) -> (&'static str, &'static str) {
        match self {
            CategoryFilter::Pme => ("categorie_entreprise", "PME"),
            CategoryFilter::Artisan => ("est_entrepreneur_individuel", "true"),
            // Employee brackets 00-03 cover the 0-9 range.
            CategoryFilter::Micro => ("tranche_effectif_salarie", "00,01,02,03"),
        }
    }
}

/// One registry search request.
#[derive(Debug, Clone)]
pub struct RegistryQuery {
    /// Free-text sector or activity ("boulangerie", "plomberie"...).
    pub sector: String,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub category: Option<CategoryFilter>,
    pub limit: usize,
    pub page: u32,
}

impl Default for RegistryQuery {
    fn default() -> Self {
        Self {
            sector: String::new(),
            city: None,
            postal_code: None,
            category: None,
            limit: 10,
            page: 1,
        }
    }
}

impl RegistryQuery {
    /// Free-text part of the request. The city joins the text query only
    /// when no postal code is given; as text it is fuzzy, as the
    /// `code_postal` filter it is exact. An empty query becomes `*`.
    fn text_query(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.sector.is_empty() {
            parts.push(&self.sector);
        }
        if self.postal_code.is_none() {
            if let Some(city) = self.city.as_deref() {
                if !city.is_empty() {
                    parts.push(city);
                }
            }
        }

        if parts.is_empty() {
            "*".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// One page of registry search results.
#[derive(Debug, Clone)]
pub struct RegistryPage {
    pub businesses: Vec<BusinessRecord>,
    /// Total matches on the server side, across all pages.
    pub total_results: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    nom_complet: Option<String>,
    #[serde(default)]
    nom_raison_sociale: Option<String>,
    #[serde(default)]
    siret: Option<String>,
    #[serde(default)]
    activite_principale: Option<String>,
    #[serde(default)]
    siege: Option<HeadOffice>,
}

#[derive(Debug, Default, Deserialize)]
struct HeadOffice {
    #[serde(default)]
    adresse: Option<String>,
    #[serde(default)]
    commune: Option<String>,
    #[serde(default)]
    code_postal: Option<String>,
}

impl SearchResult {
    fn into_record(self) -> Option<BusinessRecord> {
        let name = self
            .nom_complet
            .or(self.nom_raison_sociale)
            .filter(|n| !n.trim().is_empty())?;
        let office = self.siege.unwrap_or_default();

        Some(BusinessRecord {
            name,
            siret: self.siret,
            address: office.adresse,
            postal_code: office.code_postal,
            city: office.commune,
            activity_code: self.activite_principale,
        })
    }
}

/// Client for the registry search endpoint.
///
/// Use [`RegistryClient::new`] for production or
/// [`RegistryClient::with_base_url`] to point at a mock server in tests.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    /// Creates a client pointed at the public registry API.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        Self::with_base_url(timeout, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom endpoint URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RegistryError::Url`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        timeout: Duration,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Runs one search and maps the hits into [`BusinessRecord`]s.
    /// Nameless results are dropped with a warning; the rest of the
    /// pipeline requires a non-empty name.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnexpectedStatus`] on a non-success HTTP status.
    /// - [`RegistryError::Http`] / [`RegistryError::Deserialize`] on
    ///   transport or decoding failure.
    pub async fn search(&self, query: &RegistryQuery) -> Result<RegistryPage, RegistryError> {
        let url = self.build_url(query);
        debug!(url = %url, "registry search");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        let total = parsed.results.len();
        let businesses: Vec<BusinessRecord> = parsed
            .results
            .into_iter()
            .filter_map(SearchResult::into_record)
            .collect();
        if businesses.len() < total {
            warn!(
                dropped = total - businesses.len(),
                "registry returned results without a usable name"
            );
        }

        debug!(
            hits = businesses.len(),
            total_results = parsed.total_results,
            "registry search done"
        );
        Ok(RegistryPage {
            businesses,
            total_results: parsed.total_results,
        })
    }

    fn build_url(&self, query: &RegistryQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let per_page = query.limit.clamp(1, MAX_PER_PAGE);
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.text_query());
            pairs.append_pair("per_page", &per_page.to_string());
            pairs.append_pair("page", &query.page.to_string());
            if let Some(postal) = query.postal_code.as_deref() {
                pairs.append_pair("code_postal", postal);
            }
            if let Some(category) = query.category {
                let (key, value) = category.as_param();
                pairs.append_pair(key, value);
            }
        }
        url
    }
}
