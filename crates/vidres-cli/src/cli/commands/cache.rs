//! `vidres cache show|clear` – persisted descrambling transforms.

use anyhow::{Context, Result};
use vidres_core::decrypt::TransformCache;

pub fn run_cache_show() -> Result<()> {
    let path = TransformCache::default_path()?;
    let cache = TransformCache::new();
    match cache.load_from_path(&path)? {
        None => println!("No transform cache at {}.", path.display()),
        Some(_) if cache.is_empty() => println!("Transform cache is empty."),
        Some(_) => {
            println!("{:<20} {}", "PLAYER", "OPERATIONS");
            for (tag, transform) in cache.snapshot() {
                println!("{:<20} {}", tag, transform);
            }
        }
    }
    Ok(())
}

pub fn run_cache_clear() -> Result<()> {
    let path = TransformCache::default_path()?;
    match std::fs::remove_file(&path) {
        Ok(()) => println!("Removed {}.", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No transform cache at {}.", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("remove transform cache: {}", path.display()))
        }
    }
    Ok(())
}
