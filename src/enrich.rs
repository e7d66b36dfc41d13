//! Enrichment Merge
//!
//! Combines the two discovery paths for one business. The places lookup is
//! authoritative when it works (it confirms a real presence and adds phone
//! and rating data), but it must never block discovery: every way it can
//! decline or break lands on the domain-guessing fallback, so each business
//! always comes back with a definite answer.
//!
//! Only genuine breakage (transport failures, unreadable payloads) is
//! recorded on the record as `error_detail`. The service answering "nothing
//! found" or "request denied" is a routine outcome and falls back silently.

use tracing::{debug, warn};

use crate::places::PlacesClient;
use crate::record::{BusinessRecord, EnrichedRecord};
use crate::resolver::SiteResolver;

/// Per-business merge of the places lookup with the resolver fallback.
pub struct Enricher {
    resolver: SiteResolver,
    places: Option<PlacesClient>,
}

impl Enricher {
    /// `places` is `None` when no credential is configured; every record
    /// then takes the fallback path directly.
    pub fn new(resolver: SiteResolver, places: Option<PlacesClient>) -> Self {
        Self { resolver, places }
    }

    pub fn places_enabled(&self) -> bool {
        self.places.is_some()
    }

    /// Enrich one business. Never fails; the worst case is a fallback
    /// record with an attached error detail.
    pub async fn enrich(&self, business: BusinessRecord) -> EnrichedRecord {
        match &self.places {
            Some(client) => self.enrich_via_places(client, business).await,
            None => self.fallback(business, None).await,
        }
    }

    async fn enrich_via_places(
        &self,
        client: &PlacesClient,
        business: BusinessRecord,
    ) -> EnrichedRecord {
        let query = search_query(&business);

        let summaries = match client.text_search(&query).await {
            Ok(summaries) => summaries,
            Err(err) => {
                warn!(business = %business.identity(), error = %err, "places search failed");
                let detail = err.is_exceptional().then(|| err.to_string());
                return self.fallback(business, detail).await;
            }
        };

        let Some(first) = summaries.into_iter().next() else {
            debug!(business = %business.identity(), "places search empty, falling back");
            return self.fallback(business, None).await;
        };

        match client.details(&first.place_id).await {
            Ok(Some(details)) => {
                let website = details.website.filter(|w| !w.is_empty());
                let mut record = EnrichedRecord::via_places(business, website);
                record.phone = details.formatted_phone_number;
                record.rating = details.rating;
                record.review_count = details.user_ratings_total.unwrap_or(0);
                record.opening_hours = details
                    .opening_hours
                    .map(|hours| hours.weekday_text)
                    .unwrap_or_default();
                record
            }
            Ok(None) => {
                debug!(business = %business.identity(), "places details unusable, falling back");
                self.fallback(business, None).await
            }
            Err(err) => {
                warn!(business = %business.identity(), error = %err, "places details failed");
                let detail = err.is_exceptional().then(|| err.to_string());
                self.fallback(business, detail).await
            }
        }
    }

    /// Domain-guessing path. `detail` carries the places failure that sent
    /// us here, when there was one worth keeping.
    async fn fallback(&self, business: BusinessRecord, detail: Option<String>) -> EnrichedRecord {
        let resolution = self.resolver.resolve(&business.name).await;
        let url = resolution.url().map(str::to_string);

        let record = EnrichedRecord::via_fallback(business, url);
        match detail {
            Some(detail) => record.with_error_detail(detail),
            None => record,
        }
    }
}

/// Text query for the places search: name plus whatever location fields the
/// record has, space-joined. More context pushes the right establishment to
/// the top of the ranking.
fn search_query(business: &BusinessRecord) -> String {
    let mut query = business.name.clone();
    if let Some(city) = business.city.as_deref() {
        if !city.is_empty() {
            query.push(' ');
            query.push_str(city);
        }
    }
    if let Some(postal) = business.postal_code.as_deref() {
        if !postal.is_empty() {
            query.push(' ');
            query.push_str(postal);
        }
    }
    query
}
