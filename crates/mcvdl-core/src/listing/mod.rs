//! Listing page discovery.
//!
//! Uses the curl crate (libcurl) to fetch the version listing page and a
//! DOM query to pull client/server jar links out of it.

mod parse;

pub use parse::parse_listing;

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::downloader::Artifact;

/// Default listing page.
pub const DEFAULT_LISTING_URL: &str = "https://mcversions.net/";

/// GETs the listing page and returns its body as text.
///
/// Follows redirects and requires a 2xx status. Invalid UTF-8 is replaced.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn fetch_listing(url: &str) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("GET {} failed", url))?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    tracing::debug!(url, bytes = body.len(), "fetched listing");
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Fetches the listing at `url` and extracts its artifacts.
///
/// Blocking; see `fetch_listing`.
pub fn discover(url: &str) -> Result<Vec<Artifact>> {
    let base = Url::parse(url).with_context(|| format!("invalid listing URL: {}", url))?;
    let html = fetch_listing(url)?;
    let artifacts = parse_listing(&html, &base)?;
    tracing::info!(url, artifacts = artifacts.len(), "discovered artifacts");
    Ok(artifacts)
}
