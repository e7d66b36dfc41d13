//! Website Existence Probing
//!
//! Answers one question about one hostname: does anything respond there?
//! The check is a HEAD request with a short timeout, following redirects,
//! counting any status below 400 as "something lives here". Hosts without a
//! scheme are tried over https first and retried once over http, since many
//! small-business sites still serve plain http only.
//!
//! A probe never fails: every error (timeout, refused connection, TLS
//! problem, error status) collapses into a definite "not reachable" outcome.
//! The per-attempt error type stays visible on the internal boundary so the
//! reason can be logged before it is swallowed.

use std::fmt;
use std::time::Duration;

use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::debug;

const SECURE_BASE: &str = "https://";
const INSECURE_BASE: &str = "http://";

/// Scheme of the attempt that reached the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Https,
    Http,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// Failure of a single probe attempt. Never escapes [`ExistenceProbe::check`];
/// it exists so the resolver's debug logs can say why a candidate was skipped.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("responded with status {0}")]
    Status(reqwest::StatusCode),
}

/// Result of probing one candidate host.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// The candidate exactly as it was handed in, scheme-less.
    pub candidate: String,
    pub reachable: bool,
    /// Full URL (including scheme) of the attempt that succeeded.
    pub resolved_url: Option<String>,
    pub scheme: Option<Scheme>,
}

impl ProbeOutcome {
    fn reached(candidate: &str, url: String, scheme: Scheme) -> Self {
        Self {
            candidate: candidate.to_string(),
            reachable: true,
            resolved_url: Some(url),
            scheme: Some(scheme),
        }
    }

    fn unreachable(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_string(),
            reachable: false,
            resolved_url: None,
            scheme: None,
        }
    }
}

/// HEAD-based reachability checker shared across all candidates of a batch.
///
/// Use [`ExistenceProbe::new`] for production or
/// [`ExistenceProbe::with_scheme_bases`] to point both schemes at a mock
/// server in tests.
pub struct ExistenceProbe {
    client: reqwest::Client,
    secure_base: String,
    insecure_base: String,
}

impl ExistenceProbe {
    /// Creates a probe with the given per-attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        Self::with_scheme_bases(SECURE_BASE, INSECURE_BASE, timeout, user_agent)
    }

    /// Creates a probe whose https/http URLs are built from custom prefixes
    /// (for testing with wiremock: both prefixes point at the mock server and
    /// carry a distinguishing path).
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_scheme_bases(
        secure_base: &str,
        insecure_base: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            secure_base: secure_base.to_string(),
            insecure_base: insecure_base.to_string(),
        })
    }

    /// Probe one candidate. Scheme-less candidates get the https attempt
    /// first and one http retry on any failure; candidates that already
    /// carry a scheme are tried exactly once, as given.
    pub async fn check(&self, candidate: &str) -> ProbeOutcome {
        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            let scheme = if candidate.starts_with("https://") {
                Scheme::Https
            } else {
                Scheme::Http
            };
            return match self.attempt(candidate).await {
                Ok(()) => ProbeOutcome::reached(candidate, candidate.to_string(), scheme),
                Err(err) => {
                    debug!(candidate, error = %err, "explicit-scheme probe failed");
                    ProbeOutcome::unreachable(candidate)
                }
            };
        }

        let https_url = format!("{}{}", self.secure_base, candidate);
        match self.attempt(&https_url).await {
            Ok(()) => return ProbeOutcome::reached(candidate, https_url, Scheme::Https),
            Err(err) => {
                debug!(candidate, error = %err, "https probe failed, retrying over http");
            }
        }

        let http_url = format!("{}{}", self.insecure_base, candidate);
        match self.attempt(&http_url).await {
            Ok(()) => ProbeOutcome::reached(candidate, http_url, Scheme::Http),
            Err(err) => {
                debug!(candidate, error = %err, "http probe failed, candidate unreachable");
                ProbeOutcome::unreachable(candidate)
            }
        }
    }

    /// One HEAD request against a full URL. Redirects are followed by the
    /// client; whatever status ends the chain is the one judged here.
    async fn attempt(&self, url: &str) -> Result<(), ProbeError> {
        let response = self.client.head(url).send().await?;
        let status = response.status();

        if status.as_u16() < 400 {
            Ok(())
        } else {
            Err(ProbeError::Status(status))
        }
    }
}
