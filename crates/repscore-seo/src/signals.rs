//! Page signals the SEO rules read, extracted from a parsed HTML document.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_NAMED: LazyLock<Selector> = LazyLock::new(|| selector("meta[name]"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static BASE: LazyLock<Selector> = LazyLock::new(|| selector("base[href]"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static H2: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

// Elements whose text never renders.
const NON_TEXT: [&str; 4] = ["script", "style", "noscript", "template"];

/// Everything the SEO sub-scores need from one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    /// Trimmed `<title>` text; empty when absent.
    pub title: String,
    /// `<meta name="description">` content; empty when absent.
    pub meta_description: String,
    pub h1_count: u32,
    pub h2_count: u32,
    pub images_total: u32,
    pub images_with_alt: u32,
    pub internal_links: u32,
    pub has_viewport: bool,
    pub mentions_sitemap: bool,
    /// Visible body text with whitespace collapsed.
    pub body_text: String,
    pub word_count: u32,
    pub sentence_count: u32,
    pub links_facebook: bool,
    pub links_twitter: bool,
    pub links_linkedin: bool,
    pub html_bytes: usize,
}

impl PageSignals {
    #[must_use]
    pub fn extract(html: &str) -> Self {
        let document = Html::parse_document(html);
        let body_text = body_text(&document);
        let hrefs: Vec<&str> = document
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .collect();
        let base_href = document
            .select(&BASE)
            .find_map(|b| b.value().attr("href"))
            .filter(|h| !h.is_empty());

        let images: Vec<ElementRef<'_>> = document.select(&IMG).collect();

        Self {
            title: document
                .select(&TITLE)
                .next()
                .map(|t| collapse_whitespace(t.text()))
                .unwrap_or_default(),
            meta_description: document
                .select(&META_NAMED)
                .find(|m| {
                    m.value()
                        .attr("name")
                        .is_some_and(|n| n.eq_ignore_ascii_case("description"))
                })
                .and_then(|m| m.value().attr("content"))
                .map(|c| c.trim().to_string())
                .unwrap_or_default(),
            h1_count: count(document.select(&H1).count()),
            h2_count: count(document.select(&H2).count()),
            images_total: count(images.len()),
            images_with_alt: count(
                images
                    .iter()
                    .filter(|img| img.value().attr("alt").is_some())
                    .count(),
            ),
            internal_links: count(
                hrefs
                    .iter()
                    .filter(|h| {
                        h.starts_with('/') || base_href.is_some_and(|base| h.starts_with(base))
                    })
                    .count(),
            ),
            has_viewport: html.contains("viewport"),
            mentions_sitemap: html.contains("sitemap"),
            word_count: count(body_text.split_whitespace().count()),
            sentence_count: count(
                SENTENCE_END
                    .split(&body_text)
                    .filter(|s| !s.trim().is_empty())
                    .count(),
            ),
            links_facebook: hrefs.iter().any(|h| h.contains("facebook.com")),
            links_twitter: hrefs.iter().any(|h| is_twitter_link(h)),
            links_linkedin: hrefs.iter().any(|h| h.contains("linkedin.com")),
            html_bytes: html.len(),
            body_text,
        }
    }

    /// Average words per sentence, 0 when there are no sentences.
    #[must_use]
    pub fn words_per_sentence(&self) -> f64 {
        if self.sentence_count == 0 {
            return 0.0;
        }
        f64::from(self.word_count) / f64::from(self.sentence_count)
    }

    /// Case-insensitive occurrences of `keyword` in the body text.
    #[must_use]
    pub fn keyword_occurrences(&self, keyword: &str) -> u32 {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return 0;
        }
        count(self.body_text.to_lowercase().matches(&keyword).count())
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn is_twitter_link(href: &str) -> bool {
    href.contains("twitter.com")
        || href.contains("://x.com")
        || href.contains("://www.x.com")
}

/// Rendered text of `<body>` with whitespace collapsed; script and style
/// contents are skipped.
fn body_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    let visible = root.descendants().filter_map(|node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| NON_TEXT.contains(&parent.value().name()));
        (!hidden).then_some(&**text)
    });
    collapse_whitespace(visible)
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
