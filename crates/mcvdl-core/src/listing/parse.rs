//! Extract artifact links from listing HTML.
//!
//! The page is parsed into an HTML5 DOM, so implied end tags and stray markup
//! resolve the same way a browser would before any parent lookups happen.

use anyhow::Result;
use scraper::{Html, Selector};
use url::Url;

use crate::downloader::{Artifact, ArtifactKind};
use crate::url_model::resolve_href;

fn class_selector(kind: ArtifactKind) -> Result<Selector> {
    let css = format!(".{}", kind.as_str());
    Selector::parse(&css).map_err(|e| anyhow::anyhow!("invalid selector {}: {:?}", css, e))
}

/// Finds client and server jar links in the listing page.
///
/// An element qualifies when its class list contains `client` or `server` and
/// it has an `href`. Its version is the `id` of its grandparent element.
/// Clients come first, then servers, each in document order. Relative links
/// resolve against `base`. Links without a version id or with an unusable
/// href are skipped with a warning.
pub fn parse_listing(html: &str, base: &Url) -> Result<Vec<Artifact>> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();

    for kind in [ArtifactKind::Client, ArtifactKind::Server] {
        let selector = class_selector(kind)?;
        for link in document.select(&selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let version = link
                .parent()
                .and_then(|parent| parent.parent())
                .and_then(|grandparent| grandparent.value().as_element())
                .and_then(|element| element.id())
                .map(str::trim)
                .filter(|id| !id.is_empty());
            let Some(version) = version else {
                tracing::warn!(href, "{} link without a version id, skipping", kind);
                continue;
            };
            let Some(url) = resolve_href(base, href) else {
                tracing::warn!(href, version, "unusable {} link, skipping", kind);
                continue;
            };
            found.push(Artifact {
                url: url.to_string(),
                version: version.to_string(),
                kind,
            });
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://mcversions.net/").unwrap()
    }

    const PAGE: &str = r#"
<html><body>
  <div class="versions">
    <div id="1.20.4" class="item">
      <div class="links">
        <a class="button server" href="https://cdn.example.com/1.20.4/server.jar">Server</a>
        <a class="button client" href="https://cdn.example.com/1.20.4/client.jar">Client</a>
      </div>
    </div>
    <div id="1.20.3" class="item">
      <p class="links">
        <img src="icon.png">
        <a class='client' href="/dl/1.20.3/client.jar">Client</a>
      </p>
    </div>
  </div>
</body></html>
"#;

    #[test]
    fn clients_first_then_servers_in_document_order() {
        let found = parse_listing(PAGE, &base()).unwrap();
        let summary: Vec<(String, ArtifactKind)> = found
            .iter()
            .map(|a| (a.version.clone(), a.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1.20.4".to_string(), ArtifactKind::Client),
                ("1.20.3".to_string(), ArtifactKind::Client),
                ("1.20.4".to_string(), ArtifactKind::Server),
            ]
        );
    }

    #[test]
    fn relative_href_resolves_against_base() {
        let found = parse_listing(PAGE, &base()).unwrap();
        let c = found.iter().find(|a| a.version == "1.20.3").unwrap();
        assert_eq!(c.url, "https://mcversions.net/dl/1.20.3/client.jar");
    }

    #[test]
    fn link_without_grandparent_id_is_skipped() {
        let html = r#"<div><span><a class="client" href="/x.jar">x</a></span></div>"#;
        assert!(parse_listing(html, &base()).unwrap().is_empty());
    }

    #[test]
    fn unrelated_classes_and_missing_href_are_ignored() {
        let html = r#"<div id="1.0"><div>
            <a class="clientside" href="/a.jar">a</a>
            <a class="server">no href</a>
            <a href="/b.jar">b</a>
        </div></div>"#;
        assert!(parse_listing(html, &base()).unwrap().is_empty());
    }

    #[test]
    fn comments_and_scripts_do_not_produce_links() {
        let html = r#"<div id="1.0"><div>
            <!-- <a class="client" href="/old.jar">old</a> -->
            <script>var s = '<a class="server" href="/js.jar">';</script>
            <a class="client" href="/new.jar">new</a>
        </div></div>"#;
        let found = parse_listing(html, &base()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://mcversions.net/new.jar");
    }

    #[test]
    fn anchor_with_both_classes_yields_both_kinds() {
        let html = r#"<li id="b1.7.3"><div><a class="client server" href="/both.jar">x</a></div></li>"#;
        let found = parse_listing(html, &base()).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, ArtifactKind::Client);
        assert_eq!(found[1].kind, ArtifactKind::Server);
    }

    #[test]
    fn unclosed_paragraph_does_not_hide_links() {
        let html = r#"<div id="1.0"><p>notes<div><a class="client" href="/c.jar">c</a></div></div>"#;
        let found = parse_listing(html, &base()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version, "1.0");
        assert_eq!(found[0].url, "https://mcversions.net/c.jar");
    }

    #[test]
    fn unclosed_list_items_nest_as_siblings() {
        let html = r#"<ul>
            <li id="1.1"><div><a class="server" href="/1.1.jar">s</a></div>
            <li id="1.2"><div><a class="server" href="/1.2.jar">s</a></div>
        </ul>"#;
        let found = parse_listing(html, &base()).unwrap();
        let versions: Vec<&str> = found.iter().map(|a| a.version.as_str()).collect();
        assert_eq!(versions, vec!["1.1", "1.2"]);
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(parse_listing("", &base()).unwrap().is_empty());
    }
}
