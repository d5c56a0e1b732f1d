use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::QualityTier;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixed User-Agent sent with player script requests.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0) Gecko/20100101 Firefox/10.0 (Chrome)";

/// Player script retrieval and signature handling (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptConfig {
    /// Host serving `/yts/jsbin/player<tag>.js`.
    pub script_host: String,
    /// Query parameter carrying the scrambled signature.
    pub signature_param: String,
    /// User-Agent header for script requests.
    pub user_agent: String,
    /// Persist derived transforms under the XDG state dir.
    pub persist_cache: bool,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self {
            script_host: "s.ytimg.com".to_string(),
            signature_param: "signature".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            persist_cache: true,
        }
    }
}

/// Remote helper service used when direct resolution fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Endpoint; `?url=<watch-url>&format=best&flatten=true` is appended.
    pub base_url: String,
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: "https://unity-dev-youtube.herokuapp.com/api/info".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Format selection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Format codes tried for 2160p when no candidate carries a 2160 resolution tag.
    pub uhd_alternate_format_codes: Vec<u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            uhd_alternate_format_codes: vec![313],
        }
    }
}

/// Global configuration loaded from `~/.config/vidres/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidresConfig {
    /// Bounded wait for one candidate fetch, in seconds.
    pub fetch_timeout_secs: f64,
    /// Failed direct attempts before escalating to the fallback service.
    pub retry_threshold: u32,
    /// Skip direct resolution and always use the fallback service.
    pub force_fallback: bool,
    /// Tier used when the caller does not ask for one.
    pub default_quality: QualityTier,
    #[serde(default)]
    pub decrypt: Option<DecryptConfig>,
    #[serde(default)]
    pub fallback: Option<FallbackConfig>,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

impl Default for VidresConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs_f64(),
            retry_threshold: 1,
            force_fallback: false,
            default_quality: QualityTier::Hd,
            decrypt: None,
            fallback: None,
            catalog: None,
        }
    }
}

impl VidresConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.fetch_timeout_secs.max(0.0)).unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn decrypt_or_default(&self) -> DecryptConfig {
        self.decrypt.clone().unwrap_or_default()
    }

    pub fn fallback_or_default(&self) -> FallbackConfig {
        self.fallback.clone().unwrap_or_default()
    }

    pub fn catalog_or_default(&self) -> CatalogConfig {
        self.catalog.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidres")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VidresConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VidresConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VidresConfig = toml::from_str(&data)?;
    Ok(cfg)
}
