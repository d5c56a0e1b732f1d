//! Video URL normalization.
//!
//! Turns any accepted input form (short link, embed link, legacy `/v/` link,
//! full watch link, bare id) into a canonical identifier plus an optional
//! start offset. Normalizing a canonical watch URL yields the same id.

mod alias;
mod start_time;

pub use alias::rewrite_aliases;
pub use start_time::split_start_time;

use std::fmt;

use crate::error::ResolveError;

/// Host used in canonical watch URLs.
pub const CANONICAL_HOST: &str = "youtube.com";

/// Opaque video identifier (value of the `v` query parameter).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `https://youtube.com/watch?v=<id>`
    pub fn canonical_url(&self) -> String {
        format!("https://{}/watch?v={}", CANONICAL_HOST, self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of normalizing one input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub id: VideoId,
    /// Start offset in seconds from a `t=` marker, if one parsed cleanly.
    pub start_offset: Option<u32>,
}

impl Normalized {
    pub fn canonical_url(&self) -> String {
        self.id.canonical_url()
    }
}

/// Normalizes a user-supplied URL or bare id.
///
/// # Examples
///
/// - `normalize("https://youtu.be/abc123?t=67")` → id `abc123`, offset `Some(67)`
/// - `normalize("abc123")` → id `abc123`, offset `None`
/// - `normalize("https://example.com/notavideo")` → `Err(InvalidUrlKind)`
pub fn normalize(input: &str) -> Result<Normalized, ResolveError> {
    let trimmed = input.trim();
    let (rest, start_offset) = split_start_time(trimmed);

    let candidate = if is_valid_id(&rest) {
        format!("{}/watch?v={}", CANONICAL_HOST, rest)
    } else {
        rest
    };

    let rewritten = rewrite_aliases(&candidate)
        .ok_or_else(|| ResolveError::InvalidUrlKind(input.to_string()))?;

    let v = query_param(&rewritten, "v")
        .filter(|v| is_valid_id(v))
        .ok_or_else(|| ResolveError::InvalidUrlKind(input.to_string()))?;

    tracing::debug!(input, id = %v, ?start_offset, "normalized video url");
    Ok(Normalized {
        id: VideoId(v),
        start_offset,
    })
}

/// Video ids are non-empty runs of `[A-Za-z0-9_-]`.
pub fn is_valid_id(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reads one query parameter from a possibly scheme-less URL.
fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(&with_scheme(url)).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

pub(crate) fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
