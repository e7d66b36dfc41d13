//! Site Resolution
//!
//! Ties normalization, candidate generation and probing together for one
//! business: candidates are probed sequentially in generation order and the
//! first reachable one wins. Generation order is the ranking; nothing here
//! second-guesses it.
//!
//! Worst case for one business is every candidate timing out, so roughly
//! 16 probes x 2 attempts x the per-attempt timeout. Callers processing
//! batches are expected to parallelize across businesses, not inside one.

use tracing::debug;

use crate::candidates;
use crate::normalize;
use crate::probe::ExistenceProbe;

/// How a business name resolved.
///
/// `NoCandidates` means the name normalized to an empty slug, so no probe
/// was ever attempted. It is kept distinct from `NotFound` for callers and
/// logs, even though both surface as "no website" in result records.
#[derive(Debug, Clone)]
pub enum SiteResolution {
    Found { url: String, attempts: usize },
    NotFound { attempts: usize },
    NoCandidates,
}

impl SiteResolution {
    pub fn found(&self) -> bool {
        matches!(self, SiteResolution::Found { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            SiteResolution::Found { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Resolves one business name to a website by guessing and probing domains.
pub struct SiteResolver {
    probe: ExistenceProbe,
}

impl SiteResolver {
    pub fn new(probe: ExistenceProbe) -> Self {
        Self { probe }
    }

    /// Probe the generated candidates in order and stop at the first hit.
    ///
    /// Never fails: an unresolvable or unprobeable name comes back as
    /// `NotFound` or `NoCandidates`.
    pub async fn resolve(&self, business_name: &str) -> SiteResolution {
        let slug = normalize::slugify(business_name);
        let candidates = candidates::generate(&slug);

        if candidates.is_empty() {
            debug!(business_name, "name normalized to nothing, no candidates to probe");
            return SiteResolution::NoCandidates;
        }

        for (index, candidate) in candidates.iter().enumerate() {
            let outcome = self.probe.check(candidate).await;
            if let Some(url) = outcome.resolved_url {
                debug!(
                    business_name,
                    url,
                    attempts = index + 1,
                    "found reachable site"
                );
                return SiteResolution::Found {
                    url,
                    attempts: index + 1,
                };
            }
        }

        debug!(
            business_name,
            attempts = candidates.len(),
            "no candidate reachable"
        );
        SiteResolution::NotFound {
            attempts: candidates.len(),
        }
    }
}
