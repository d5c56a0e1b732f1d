//! Client for the remote helper service used when direct resolution fails.

mod parse;

pub use parse::{ServiceFormat, ServiceResponse, ServiceVideo, BEST_WITH_AUDIO_FORMAT};

use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::CandidateSet;
use crate::config::FallbackConfig;
use crate::error::ResolveError;
use crate::http::{self, HttpError};
use crate::resolver::CandidateSource;
use crate::url_model::VideoId;

/// `GET <base>?url=<watch-url>&format=best&flatten=true`, parsed into candidates.
#[derive(Debug, Clone)]
pub struct FallbackServiceClient {
    base_url: String,
    timeout: Duration,
}

impl FallbackServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &FallbackConfig) -> Self {
        Self::new(cfg.base_url.clone(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn request_url(&self, id: &VideoId) -> Result<String, ResolveError> {
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[
                ("url", id.canonical_url()),
                ("format", "best".to_string()),
                ("flatten", "true".to_string()),
            ],
        )
        .map_err(|e| ResolveError::ServiceUnreachable(format!("bad base url: {e}")))?;
        Ok(url.into())
    }
}

fn classify(e: HttpError) -> ResolveError {
    match e {
        HttpError::Body(_) => ResolveError::ServiceResponseMalformed(e.to_string()),
        _ => ResolveError::ServiceUnreachable(e.to_string()),
    }
}

#[async_trait]
impl CandidateSource for FallbackServiceClient {
    async fn fetch_candidates(&self, id: &VideoId) -> Result<CandidateSet, ResolveError> {
        let url = self.request_url(id)?;
        tracing::debug!(%url, "querying fallback service");
        let body = http::get_text_async(url, Vec::new(), self.timeout)
            .await
            .map_err(|e| {
                tracing::warn!(video = %id, error = %e, "fallback service request failed");
                classify(e)
            })?;
        let set = ServiceResponse::from_json(&body)?.to_candidate_set()?;
        tracing::debug!(video = %id, candidates = set.len(), "fallback service answered");
        Ok(set)
    }
}
