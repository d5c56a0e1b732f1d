//! `vidres resolve <url>` – run the resolution pipeline in load-only mode.

use std::sync::Arc;

use anyhow::{bail, Result};
use vidres_core::catalog::{FormatCatalog, QualityTier};
use vidres_core::config::VidresConfig;
use vidres_core::decrypt::{SignatureDecryptor, TransformCache};
use vidres_core::fallback::FallbackServiceClient;
use vidres_core::orchestrator::{
    Collaborators, NoPlayback, Orchestrator, OrchestratorConfig, Outcome,
};
use vidres_core::resolver::DirectUnavailable;

pub async fn run_resolve(
    cfg: &VidresConfig,
    url: &str,
    quality: Option<QualityTier>,
    force_fallback: bool,
) -> Result<()> {
    let tier = quality.unwrap_or(cfg.default_quality);
    let decrypt_cfg = cfg.decrypt_or_default();
    let decryptor = Arc::new(SignatureDecryptor::from_config(&decrypt_cfg));
    if decrypt_cfg.persist_cache {
        load_transform_cache(decryptor.cache());
    }

    let orch_cfg = OrchestratorConfig {
        force_fallback: cfg.force_fallback || force_fallback,
        load_urls_only: true,
        ..OrchestratorConfig::from_config(cfg)
    };
    let mut orch = Orchestrator::new(
        orch_cfg,
        FormatCatalog::from_config(&cfg.catalog_or_default()),
        Collaborators {
            direct: Arc::new(DirectUnavailable),
            fallback: Arc::new(FallbackServiceClient::from_config(&cfg.fallback_or_default())),
            decryptor: Arc::clone(&decryptor),
            sink: Arc::new(NoPlayback),
        },
    );

    orch.play(url, tier)?;
    let outcome = orch.next_outcome().await;

    if decrypt_cfg.persist_cache {
        save_transform_cache(decryptor.cache());
    }

    match outcome {
        Some(Outcome::Resolved(r)) => {
            println!("id:       {}", r.id);
            println!("tier:     {}{}", r.tier, if r.downgraded { " (downgraded)" } else { "" });
            println!("video:    {}", r.video_url);
            if let Some(audio) = &r.audio_url {
                println!("audio:    {}", audio);
            }
            if let Some(secs) = r.start_offset {
                println!("start:    {}s", secs);
            }
            println!("source:   {}", if r.via_fallback { "fallback" } else { "direct" });
            Ok(())
        }
        Some(Outcome::Failed(e)) => bail!("resolution failed: {e}"),
        Some(Outcome::Finished) | None => bail!("resolution ended without a result"),
    }
}

/// Loads persisted transforms; a broken cache file is logged and ignored.
pub(crate) fn load_transform_cache(cache: &TransformCache) {
    let loaded = TransformCache::default_path().and_then(|path| cache.load_from_path(&path));
    match loaded {
        Ok(Some(n)) => tracing::debug!(entries = n, "loaded transform cache"),
        Ok(None) => {}
        Err(e) => tracing::warn!("ignoring transform cache: {e:#}"),
    }
}

pub(crate) fn save_transform_cache(cache: &TransformCache) {
    if cache.is_empty() {
        return;
    }
    if let Err(e) = TransformCache::default_path().and_then(|path| cache.save_to_path(&path)) {
        tracing::warn!("could not save transform cache: {e:#}");
    }
}
