//! Tests for resolve and decrypt.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use vidres_core::catalog::QualityTier;

#[test]
fn cli_parse_resolve_defaults() {
    match parse(&["vidres", "resolve", "https://youtu.be/abc123"]) {
        CliCommand::Resolve {
            url,
            quality,
            fallback,
        } => {
            assert_eq!(url, "https://youtu.be/abc123");
            assert!(quality.is_none());
            assert!(!fallback);
        }
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_quality_and_fallback() {
    match parse(&["vidres", "resolve", "abc123", "--quality", "fullhd", "--fallback"]) {
        CliCommand::Resolve {
            quality, fallback, ..
        } => {
            assert_eq!(quality, Some(QualityTier::FullHd));
            assert!(fallback);
        }
        _ => panic!("expected Resolve with options"),
    }
}

#[test]
fn cli_parse_resolve_quality_by_resolution() {
    match parse(&["vidres", "resolve", "abc123", "-q", "2160p"]) {
        CliCommand::Resolve { quality, .. } => assert_eq!(quality, Some(QualityTier::Uhd2160)),
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_rejects_unknown_quality() {
    assert!(Cli::try_parse_from(["vidres", "resolve", "abc123", "--quality", "8k"]).is_err());
}

#[test]
fn cli_parse_decrypt() {
    match parse(&[
        "vidres",
        "decrypt",
        "https://cdn.example/v?signature=abc",
        "--player",
        "-vflXyz",
    ]) {
        CliCommand::Decrypt { url, player } => {
            assert_eq!(url, "https://cdn.example/v?signature=abc");
            assert_eq!(player, "-vflXyz");
        }
        _ => panic!("expected Decrypt"),
    }
}

#[test]
fn cli_parse_decrypt_player_tag_with_equals() {
    match parse(&[
        "vidres",
        "decrypt",
        "--player=-vfl4OEYh9",
        "https://cdn.example/v?signature=abc",
    ]) {
        CliCommand::Decrypt { player, .. } => assert_eq!(player, "-vfl4OEYh9"),
        _ => panic!("expected Decrypt"),
    }
}

#[test]
fn cli_parse_decrypt_requires_player() {
    assert!(Cli::try_parse_from(["vidres", "decrypt", "https://cdn.example/v"]).is_err());
}
