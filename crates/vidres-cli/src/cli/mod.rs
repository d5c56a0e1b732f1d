//! CLI for the vidres video URL resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use vidres_core::catalog::QualityTier;
use vidres_core::config;

use commands::{
    run_cache_clear, run_cache_show, run_completions, run_decrypt, run_normalize, run_resolve,
};

/// Top-level CLI for vidres.
#[derive(Debug, Parser)]
#[command(name = "vidres")]
#[command(about = "vidres: resolve video page URLs into direct playable stream URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a video URL or id into stream URLs (uses the fallback service).
    Resolve {
        /// Watch URL, short link, embed link or bare video id.
        url: String,
        /// Quality tier: low, hd, fullhd, uhd1440, uhd2160 (or 720, 1080p, ...).
        #[arg(long, short = 'q', value_name = "TIER")]
        quality: Option<QualityTier>,
        /// Start on the fallback service (same as `force_fallback` in config).
        #[arg(long)]
        fallback: bool,
    },

    /// Descramble the signature of one obfuscated stream URL.
    Decrypt {
        /// Stream URL carrying the scrambled signature parameter.
        url: String,
        /// Player version tag the signature was scrambled with (tags start with `-`).
        #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
        player: String,
    },

    /// Print the canonical watch URL, id and start offset for an input.
    Normalize {
        input: String,
    },

    /// Inspect or clear the persisted descrambling transform cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// List cached player versions and their operations.
    Show,
    /// Delete the cache file.
    Clear,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need no config.
        match &cli.command {
            CliCommand::Normalize { input } => return run_normalize(input),
            CliCommand::Completions { shell } => {
                run_completions(*shell);
                return Ok(());
            }
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Resolve {
                url,
                quality,
                fallback,
            } => run_resolve(&cfg, &url, quality, fallback).await?,
            CliCommand::Decrypt { url, player } => run_decrypt(&cfg, &url, &player).await?,
            CliCommand::Cache { action } => match action {
                CacheAction::Show => run_cache_show()?,
                CacheAction::Clear => run_cache_clear()?,
            },
            CliCommand::Normalize { .. } | CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
