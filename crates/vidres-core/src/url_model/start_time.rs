//! Start-time marker (`?t=` / `&t=`) extraction.

/// Removes the start-time parameter from `url` and parses its value.
///
/// The last `?t=` or `&t=` wins. The value is whole seconds with an optional
/// trailing `s`; anything else yields `None` but the parameter is still
/// removed. Parameters after the marker are kept.
pub fn split_start_time(url: &str) -> (String, Option<u32>) {
    let pos = match (url.rfind("?t="), url.rfind("&t=")) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return (url.to_string(), None),
    };

    let separator = &url[pos..pos + 1];
    let after = &url[pos + 3..];
    let (value, tail) = match after.split_once('&') {
        Some((value, tail)) => (value, Some(tail)),
        None => (after, None),
    };
    let seconds = value.strip_suffix('s').unwrap_or(value).parse::<u32>().ok();

    let stripped = match tail {
        Some(tail) if !tail.is_empty() => format!("{}{}{}", &url[..pos], separator, tail),
        _ => url[..pos].to_string(),
    };
    (stripped, seconds)
}
