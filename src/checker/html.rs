// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML documents.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever, so malformed markup is repaired rather than rejected
// - Supports CSS selectors for finding elements
//
// We also use the `url` crate to resolve relative hrefs against a base URL.
//
// Output is an ordered list of Link values, one per <a href> in the
// document. Duplicates are kept: each occurrence is checked on its own
// unless the scheduler is asked to memoize.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::ExtractError;

// hrefs with these prefixes are never links we can check
const IGNORED_PREFIXES: [&str; 3] = ["javascript:", "mailto:", "tel:"];

/// A hyperlink found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL after resolution, or the trimmed href when no base applies
    pub target: String,
    /// Whitespace-normalized anchor text, or the target when the anchor is empty
    pub display_text: String,
}

// Extracts all links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base: optional base URL for resolving relative hrefs
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base = Some("https://example.com/a/")
//   result = [Link { target: "https://example.com/docs", display_text: "Docs" }]
pub fn extract_html_links(html: &str, base: Option<&Url>) -> Result<Vec<Link>, ExtractError> {
    let selector =
        Selector::parse("a[href]").map_err(|e| ExtractError::Selector(format!("{e:?}")))?;

    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        // html5ever recovers from these; they only matter when debugging
        debug!(
            count = document.errors.len(),
            first = %document.errors[0],
            "recovered from HTML parse errors"
        );
    }

    let links = document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if is_ignored_href(href) {
                return None;
            }

            let target = resolve_target(base, href);
            let display_text = match normalized_text(element) {
                text if text.is_empty() => target.clone(),
                text => text,
            };

            Some(Link {
                target,
                display_text,
            })
        })
        .collect();

    Ok(links)
}

// Empty hrefs and javascript:/mailto:/tel: are dropped entirely (not even
// counted as skipped)
fn is_ignored_href(href: &str) -> bool {
    href.is_empty()
        || IGNORED_PREFIXES.iter().any(|prefix| {
            href.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
}

// Only hrefs without an authority ("//host") are joined with the base.
// Everything else, including "ftp://..." and "//cdn.example.com/x", is kept
// verbatim and left for the prober's scheme guard.
fn resolve_target(base: Option<&Url>, href: &str) -> String {
    match base {
        Some(base) if !has_authority(href) => match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!(href, error = %e, "could not resolve href against base");
                href.to_string()
            }
        },
        _ => href.to_string(),
    }
}

fn has_authority(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }
    Url::parse(href).map(|url| url.has_host()).unwrap_or(false)
}

// Concatenates every text node under the anchor and collapses runs of
// whitespace (spaces, tabs, newlines) into single spaces
fn normalized_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why doesn't parsing return an error for broken HTML?
//    - html5ever follows the HTML5 standard's error recovery, like a browser
//    - Unclosed tags, stray end tags, etc. still produce a usable DOM
//    - The recovered errors are kept in document.errors; we only log them
//
// 2. Why keep the raw href when there is no base?
//    - Without a base we can't know what "/docs" points to
//    - The scheduler will report it as Skipped (non-HTTP scheme)
//
// 3. What does base.join() do?
//    - Resolves a relative reference the way a browser does
//    - "https://example.com/a/" + "/docs" = "https://example.com/docs"
//    - "https://example.com/a/" + "b"     = "https://example.com/a/b"
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn targets(links: &[Link]) -> Vec<&str> {
        links.iter().map(|l| l.target.as_str()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(
            links,
            vec![Link {
                target: "https://www.rust-lang.org".to_string(),
                display_text: "Rust".to_string(),
            }]
        );
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let base = base("https://example.com/a/");
        let links = extract_html_links(html, Some(&base)).unwrap();
        assert_eq!(targets(&links), vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_resolve_path_relative_link() {
        let html = r#"<a href="b/c.html">C</a><a href="../up">Up</a>"#;
        let base = base("https://example.com/a/");
        let links = extract_html_links(html, Some(&base)).unwrap();
        assert_eq!(
            targets(&links),
            vec!["https://example.com/a/b/c.html", "https://example.com/up"]
        );
    }

    #[test]
    fn test_relative_link_without_base_is_kept_verbatim() {
        let html = r#"<a href="  /docs  ">Docs</a>"#;
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(targets(&links), vec!["/docs"]);
    }

    #[test]
    fn test_links_with_authority_are_not_resolved() {
        let html = r#"
            <a href="ftp://files.example.org/x">FTP</a>
            <a href="//cdn.example.org/lib.js">CDN</a>
        "#;
        let base = base("https://example.com/");
        let links = extract_html_links(html, Some(&base)).unwrap();
        assert_eq!(
            targets(&links),
            vec!["ftp://files.example.org/x", "//cdn.example.org/lib.js"]
        );
    }

    #[test]
    fn test_drop_ignored_schemes_and_empty_hrefs() {
        let html = r#"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+15551234">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:alert(1)">JS upper</a>
            <a href="   ">Blank</a>
            <a>No href</a>
            <a href="https://example.com/kept">Kept</a>
        "#;
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(targets(&links), vec!["https://example.com/kept"]);
    }

    #[test]
    fn test_display_text_is_whitespace_normalized() {
        let html = "<a href=\"https://example.com\">\n  Hello\t\t<b>big</b>\n   world  </a>";
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(links[0].display_text, "Hello big world");
    }

    #[test]
    fn test_empty_display_text_falls_back_to_target() {
        let html = r#"<a href="/logo"><img src="logo.png"></a>"#;
        let base = base("https://example.com/");
        let links = extract_html_links(html, Some(&base)).unwrap();
        assert_eq!(links[0].display_text, "https://example.com/logo");
    }

    #[test]
    fn test_duplicates_are_kept_in_document_order() {
        let html = r#"
            <a href="https://b.example">B</a>
            <a href="https://a.example">A</a>
            <a href="https://b.example">B again</a>
        "#;
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(
            targets(&links),
            vec!["https://b.example", "https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let html = r#"<title>t</title><a href="https://example.com/x">unclosed<p>stray</div>"#;
        let links = extract_html_links(html, None).unwrap();
        assert_eq!(targets(&links), vec!["https://example.com/x"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = r#"
            <a href="/one">One</a>
            <a href="mailto:x@y.z">Mail</a>
            <a href="https://two.example">Two</a>
        "#;
        let base = base("https://example.com/");
        let first = extract_html_links(html, Some(&base)).unwrap();
        let second = extract_html_links(html, Some(&base)).unwrap();
        assert_eq!(first, second);
    }
}
