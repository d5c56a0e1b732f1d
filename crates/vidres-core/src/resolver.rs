//! Candidate sources the orchestrator can query.
//!
//! The orchestrator only depends on these traits. Direct resolution belongs
//! to an external resolver; the fallback service client is the other source.

use async_trait::async_trait;

use crate::catalog::CandidateSet;
use crate::error::ResolveError;
use crate::url_model::VideoId;

/// External resolver that produces direct (possibly encrypted) candidates.
#[async_trait]
pub trait CandidateResolver: Send + Sync {
    async fn get_download_urls(&self, id: &VideoId) -> Result<CandidateSet, ResolveError>;
}

/// Any other producer of candidate sets (the fallback service).
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(&self, id: &VideoId) -> Result<CandidateSet, ResolveError>;
}

/// Resolver used when no direct resolver is wired in: every attempt fails,
/// so the session escalates to the fallback source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectUnavailable;

#[async_trait]
impl CandidateResolver for DirectUnavailable {
    async fn get_download_urls(&self, id: &VideoId) -> Result<CandidateSet, ResolveError> {
        Err(ResolveError::ResolverFailed(format!(
            "no direct resolver configured for {id}"
        )))
    }
}
