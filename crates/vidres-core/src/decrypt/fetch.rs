use std::time::Duration;

use async_trait::async_trait;

use crate::config::DecryptConfig;
use crate::error::ResolveError;
use crate::http;

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the player script text for a version tag.
#[async_trait]
pub trait PlayerScriptFetcher: Send + Sync {
    async fn fetch(&self, player_version: &str) -> Result<String, ResolveError>;
}

/// Downloads `http://<host>/yts/jsbin/player<tag>.js` with a fixed User-Agent.
#[derive(Debug, Clone)]
pub struct HttpScriptFetcher {
    script_host: String,
    user_agent: String,
    timeout: Duration,
}

impl HttpScriptFetcher {
    pub fn new(script_host: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            script_host: script_host.into(),
            user_agent: user_agent.into(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    pub fn from_config(cfg: &DecryptConfig) -> Self {
        Self::new(cfg.script_host.clone(), cfg.user_agent.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script_url(&self, player_version: &str) -> String {
        format!(
            "http://{}/yts/jsbin/player{}.js",
            self.script_host, player_version
        )
    }
}

#[async_trait]
impl PlayerScriptFetcher for HttpScriptFetcher {
    async fn fetch(&self, player_version: &str) -> Result<String, ResolveError> {
        let url = self.script_url(player_version);
        tracing::debug!(%url, "fetching player script");
        let headers = vec![("User-Agent".to_string(), self.user_agent.clone())];
        http::get_text_async(url.clone(), headers, self.timeout)
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "player script fetch failed");
                ResolveError::ScriptFetchFailed(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_url_from_tag() {
        let f = HttpScriptFetcher::from_config(&DecryptConfig::default());
        assert_eq!(
            f.script_url("-vfl4OEYh9"),
            "http://s.ytimg.com/yts/jsbin/player-vfl4OEYh9.js"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_script_fetch_failure() {
        let f = HttpScriptFetcher::new("127.0.0.1:9", "ua").with_timeout(Duration::from_secs(2));
        let err = f.fetch("v1").await.unwrap_err();
        assert!(matches!(err, ResolveError::ScriptFetchFailed(_)));
    }
}
