//! `vidres decrypt <url> --player <tag>` – descramble one stream URL.

use anyhow::Result;
use vidres_core::catalog::{ContainerType, PlaybackCandidate};
use vidres_core::config::VidresConfig;
use vidres_core::decrypt::SignatureDecryptor;

use super::resolve::{load_transform_cache, save_transform_cache};

pub async fn run_decrypt(cfg: &VidresConfig, url: &str, player: &str) -> Result<()> {
    let decrypt_cfg = cfg.decrypt_or_default();
    let decryptor = SignatureDecryptor::from_config(&decrypt_cfg);
    if decrypt_cfg.persist_cache {
        load_transform_cache(decryptor.cache());
    }

    // Format details do not matter for descrambling.
    let candidate = PlaybackCandidate::encrypted(0, ContainerType::Other, 0, false, url, player);
    let resolved = decryptor.decrypt(&candidate).await?;
    println!("{}", resolved);

    if decrypt_cfg.persist_cache {
        save_transform_cache(decryptor.cache());
    }
    Ok(())
}
