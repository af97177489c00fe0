//! URL and local path helpers for discovered artifacts.

mod sanitize;

pub use sanitize::sanitize_path_component;

use url::Url;

/// Resolves an `href` found on the listing page against the page URL.
///
/// Decodes `&amp;`, accepts absolute and relative links, and rejects anything
/// that is not http(s).
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim().replace("&amp;", "&");
    if href.is_empty() {
        return None;
    }
    let url = base.join(&href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}
