//! Signature descrambling for obfuscated download URLs.
//!
//! A candidate marked as encrypted carries a player version tag. The player
//! script for that tag is fetched once, the descrambling routine is recovered
//! from its text (see `extract`), and the resulting transform is cached
//! process-wide. Applying the transform to the signature query parameter
//! yields the playable URL.

mod cache;
mod extract;
mod fetch;
mod persist;
mod transform;

pub use cache::TransformCache;
pub use extract::extract_transform;
pub use fetch::{HttpScriptFetcher, PlayerScriptFetcher};
pub use transform::{DescramblingTransform, TransformOp};

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::PlaybackCandidate;
use crate::config::DecryptConfig;
use crate::error::ResolveError;

/// Resolves signature-obfuscated candidates into playable URLs.
pub struct SignatureDecryptor {
    fetcher: Arc<dyn PlayerScriptFetcher>,
    cache: Arc<TransformCache>,
    signature_param: String,
    /// Serializes cache misses so one tag is fetched at most once.
    miss_lock: Mutex<()>,
}

impl SignatureDecryptor {
    pub fn new(
        fetcher: Arc<dyn PlayerScriptFetcher>,
        cache: Arc<TransformCache>,
        signature_param: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            signature_param: signature_param.into(),
            miss_lock: Mutex::new(()),
        }
    }

    /// HTTP fetcher and the process-wide cache.
    pub fn from_config(cfg: &DecryptConfig) -> Self {
        Self::new(
            Arc::new(HttpScriptFetcher::from_config(cfg)),
            TransformCache::shared(),
            cfg.signature_param.clone(),
        )
    }

    pub fn cache(&self) -> &Arc<TransformCache> {
        &self.cache
    }

    /// Returns the playable URL for an encrypted candidate.
    ///
    /// A URL without the signature parameter is returned unchanged.
    pub async fn decrypt(&self, candidate: &PlaybackCandidate) -> Result<String, ResolveError> {
        let tag = candidate
            .player_version()
            .ok_or(ResolveError::DecryptionUnsupported)?;
        let url = candidate.download_url();

        let Some(mut parsed) = url::Url::parse(url).ok() else {
            tracing::debug!(%url, "candidate url not parseable, leaving as is");
            return Ok(url.to_string());
        };
        let Some(signature) = query_value(&parsed, &self.signature_param) else {
            return Ok(url.to_string());
        };

        let transform = self.transform_for(tag).await?;
        let descrambled = on_worker(move || transform.apply(&signature)).await?;
        replace_query_value(&mut parsed, &self.signature_param, &descrambled);
        tracing::debug!(player_version = tag, "signature descrambled");
        Ok(parsed.into())
    }

    async fn transform_for(&self, tag: &str) -> Result<Arc<DescramblingTransform>, ResolveError> {
        if let Some(t) = self.cache.get(tag) {
            return Ok(t);
        }
        let _guard = self.miss_lock.lock().await;
        if let Some(t) = self.cache.get(tag) {
            return Ok(t);
        }

        let script = self.fetcher.fetch(tag).await?;
        let transform = on_worker(move || extract_transform(&script)).await??;
        tracing::info!(player_version = tag, ops = %transform, "derived descrambling transform");
        Ok(self.cache.insert(tag, transform))
    }
}

/// Runs CPU-bound string work on the blocking pool when more than one core is
/// available, inline otherwise.
async fn on_worker<T, F>(f: F) -> Result<T, ResolveError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let parallel = std::thread::available_parallelism()
        .map(|n| n.get() > 1)
        .unwrap_or(false);
    if !parallel {
        return Ok(f());
    }
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ResolveError::TransformExtractionFailed(format!("worker: {e}")))
}

fn query_value(url: &url::Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Rewrites the value of `name` in place. Every other byte of the query is
/// kept as sent, so pairs the CDN signs over stay untouched.
fn replace_query_value(url: &mut url::Url, name: &str, value: &str) {
    let Some(query) = url.query() else {
        return;
    };
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    let rewritten = query
        .split('&')
        .map(|segment| {
            let raw_key = segment.split_once('=').map_or(segment, |(k, _)| k);
            let key_matches = url::form_urlencoded::parse(segment.as_bytes())
                .next()
                .is_some_and(|(k, _)| k == name);
            if key_matches {
                format!("{raw_key}={encoded}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&rewritten));
}
