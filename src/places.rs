//! Places API Client
//!
//! Thin client for the Google Places web service, covering the two calls
//! the enricher needs: free-text search to find a place, then a details
//! lookup for website and contact fields. Responses carry their own
//! `status` field on top of the HTTP status; both are checked here so the
//! enricher can treat "the service said no" and "the network broke"
//! differently.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Field list requested from the details endpoint. Anything not listed here
/// is not billed and not returned.
const DETAILS_FIELDS: &str =
    "name,website,formatted_phone_number,rating,user_ratings_total,opening_hours,formatted_address";

/// Results language and ranking region. This tool targets French businesses.
const LANGUAGE: &str = "fr";
const REGION: &str = "fr";

/// Errors returned by the places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The payload's own `status` field reported failure (bad key, quota,
    /// malformed request).
    #[error("places API status {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PlacesError {
    /// True for failures worth surfacing on the record (broken transport or
    /// an unreadable body), as opposed to the service declining the query.
    pub fn is_exceptional(&self) -> bool {
        matches!(
            self,
            PlacesError::Http(_) | PlacesError::Deserialize { .. } | PlacesError::Url(_)
        )
    }
}

/// One hit from the text-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

/// Fields returned by the details endpoint for [`DETAILS_FIELDS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: String,
    #[serde(default)]
    results: Vec<PlaceSummary>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: String,
    result: Option<PlaceDetails>,
}

/// Client for the places search and details endpoints.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a client pointed at the production places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout: Duration, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Url`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Base must end in a slash so join() appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Free-text place search, ranked by the service.
    ///
    /// An empty vector means the service answered cleanly with zero results.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::UnexpectedStatus`] on a non-success HTTP status.
    /// - [`PlacesError::Api`] if the payload status is anything other than
    ///   `OK` or `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] on transport
    ///   or decoding failure.
    pub async fn text_search(&self, query: &str) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = self.build_url(
            "textsearch/json",
            &[("query", query), ("language", LANGUAGE), ("region", REGION)],
        )?;
        let envelope: SearchEnvelope = self.request_json(&url).await?;

        match envelope.status.as_str() {
            "OK" => {
                debug!(query, hits = envelope.results.len(), "places search succeeded");
                Ok(envelope.results)
            }
            "ZERO_RESULTS" => {
                debug!(query, "places search found nothing");
                Ok(Vec::new())
            }
            other => Err(PlacesError::Api(other.to_string())),
        }
    }

    /// Details lookup for one place identifier.
    ///
    /// Returns `Ok(None)` when the service answers without a usable result
    /// (non-`OK` payload status or a missing `result` object).
    ///
    /// # Errors
    ///
    /// - [`PlacesError::UnexpectedStatus`] on a non-success HTTP status.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] on transport
    ///   or decoding failure.
    pub async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("language", LANGUAGE),
            ],
        )?;
        let envelope: DetailsEnvelope = self.request_json(&url).await?;

        if envelope.status == "OK" {
            Ok(envelope.result)
        } else {
            debug!(place_id, status = %envelope.status, "places details unusable");
            Ok(None)
        }
    }

    /// Builds the endpoint URL with percent-encoded query parameters; the
    /// key goes last like the documented examples.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self.base_url.join(endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, checks the HTTP status, and parses the body.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", Duration::from_secs(5), "siteprospector-test", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn test_build_search_url() {
        let client = test_client("https://maps.googleapis.com/maps/api/place");
        let url = client
            .build_url("textsearch/json", &[("query", "boulangerie dupont paris"), ("language", "fr"), ("region", "fr")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/place/textsearch/json?query=boulangerie+dupont+paris&language=fr&region=fr&key=test-key"
        );
    }

    #[test]
    fn test_build_details_url_carries_field_list() {
        let client = test_client("https://maps.googleapis.com/maps/api/place/");
        let url = client
            .build_url("details/json", &[("place_id", "abc123"), ("fields", DETAILS_FIELDS)])
            .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("place_id=abc123"));
        assert!(query.contains("user_ratings_total"));
        assert!(query.contains("opening_hours"));
        assert!(query.ends_with("key=test-key"));
    }

    #[test]
    fn test_exceptional_classification() {
        assert!(PlacesError::Deserialize {
            context: "details/json".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        }
        .is_exceptional());
        assert!(!PlacesError::Api("REQUEST_DENIED".to_string()).is_exceptional());
        assert!(!PlacesError::UnexpectedStatus(reqwest::StatusCode::BAD_GATEWAY).is_exceptional());
    }
}
