//! Rewrite known alias URL shapes into the `watch?v=` form.

/// Rewrites short links, embed links, legacy `/v/` links and `/watch#`
/// fragments so the id ends up in the `v` query parameter.
///
/// Returns `None` only when a `/v/` link cannot be parsed as a URL.
pub fn rewrite_aliases(url: &str) -> Option<String> {
    let mut url = url
        .trim()
        .replace("youtu.be/", "youtube.com/watch?v=")
        .replace("www.youtube", "youtube")
        .replace("youtube.com/embed/", "youtube.com/watch?v=");

    if url.contains("/v/") {
        let parsed = url::Url::parse(&super::with_scheme(&url)).ok()?;
        url = format!(
            "https://{}{}",
            super::CANONICAL_HOST,
            parsed.path().replace("/v/", "/watch?v=")
        );
    }

    Some(join_query_separators(&url.replace("/watch#", "/watch?")))
}

/// `watch?v=ID?si=x` (from a short or embed link with its own query)
/// becomes `watch?v=ID&si=x`: every `?` after the first one separates pairs.
fn join_query_separators(url: &str) -> String {
    match url.split_once('?') {
        Some((head, query)) => format!("{}?{}", head, query.replace('?', "&")),
        None => url.to_string(),
    }
}
