//! Concurrent Batch Processing
//!
//! Fans a per-business task out over a bounded pool of workers and collects
//! the results as they finish. Tasks return a result-or-error sum; a failed
//! task becomes a degraded record tagged `error`, so one broken item can
//! never abort the batch or eat the other results. After the batch drains,
//! records are sorted with the interesting ones first: businesses without a
//! website are the prospects this tool exists to find.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::enrich::Enricher;
use crate::record::{BusinessRecord, EnrichedRecord, SourceMethod};
use crate::resolver::SiteResolver;

/// Concurrent workers unless configured otherwise.
pub const DEFAULT_WORKERS: usize = 10;

/// What one task hands back to the runner. `Err` is absorbed into a
/// degraded record, never propagated.
pub type TaskResult = anyhow::Result<EnrichedRecord>;

/// A completed batch: sorted records plus the aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub records: Vec<EnrichedRecord>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Build a report from already-processed records, re-sorting and
    /// re-tallying. Used when a filter narrows an existing batch.
    pub fn from_records(mut records: Vec<EnrichedRecord>) -> Self {
        sort_prospects_first(&mut records);
        let summary = BatchSummary::tally(&records, Utc::now());
        Self { records, summary }
    }
}

/// Aggregate counts for one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub with_site: usize,
    pub without_site: usize,
    pub via_places: usize,
    pub via_fallback: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl BatchSummary {
    fn tally(records: &[EnrichedRecord], started_at: DateTime<Utc>) -> Self {
        let with_site = records.iter().filter(|r| r.has_website).count();
        let count_method =
            |method: SourceMethod| records.iter().filter(|r| r.source_method == method).count();

        let duration = Utc::now().signed_duration_since(started_at);
        Self {
            total: records.len(),
            with_site,
            without_site: records.len() - with_site,
            via_places: count_method(SourceMethod::Places),
            via_fallback: count_method(SourceMethod::Fallback),
            errors: count_method(SourceMethod::Error),
            started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        }
    }
}

/// Run `task` over every record with at most `workers` in flight.
///
/// Dispatch and completion order are unspecified; the returned records are
/// sorted ascending by `(has_website, name)`, and there is exactly one
/// output record per input record regardless of task failures.
pub async fn run<F, Fut>(records: Vec<BusinessRecord>, workers: usize, task: F) -> BatchReport
where
    F: Fn(BusinessRecord) -> Fut,
    Fut: Future<Output = TaskResult>,
{
    let total = records.len();
    let started_at = Utc::now();
    let completed = AtomicUsize::new(0);

    let mut processed: Vec<EnrichedRecord> = stream::iter(records)
        .map(|business| {
            // Keep a copy so a failing task still yields a record.
            let original = business.clone();
            let fut = task(business);
            let completed = &completed;
            async move {
                let record = match fut.await {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(business = %original.identity(), error = %err, "task failed");
                        EnrichedRecord::via_error(original, format!("{err:#}"))
                    }
                };
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                info!(
                    progress = %format!("{done}/{total}"),
                    business = %record.business.name,
                    has_website = record.has_website,
                    "processed"
                );
                record
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    sort_prospects_first(&mut processed);
    let summary = BatchSummary::tally(&processed, started_at);

    BatchReport {
        records: processed,
        summary,
    }
}

/// Check-only batch: resolve a website for each business, no external
/// enrichment. Every record comes back tagged `fallback` since the
/// domain-guessing path produced it.
pub async fn run_site_checks(
    resolver: &SiteResolver,
    records: Vec<BusinessRecord>,
    workers: usize,
) -> BatchReport {
    run(records, workers, |business| async move {
        let resolution = resolver.resolve(&business.name).await;
        let url = resolution.url().map(str::to_string);
        Ok(EnrichedRecord::via_fallback(business, url))
    })
    .await
}

/// Full enrichment batch: places lookup with resolver fallback per record.
pub async fn run_enrichment(
    enricher: &Enricher,
    records: Vec<BusinessRecord>,
    workers: usize,
) -> BatchReport {
    run(records, workers, |business| async move {
        Ok(enricher.enrich(business).await)
    })
    .await
}

/// Ascending by `(has_website, name)`: businesses without a website first,
/// ties broken by name.
pub fn sort_prospects_first(records: &mut [EnrichedRecord]) {
    records.sort_by(|a, b| {
        a.has_website
            .cmp(&b.has_website)
            .then_with(|| a.business.name.cmp(&b.business.name))
    });
}
