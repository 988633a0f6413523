//! Sub-score rules for each SEO dimension.
//!
//! Every sub-score is capped at 100. Backlink data needs a third-party
//! index and is reported as unknown.

use repscore_core::{
    round_to, Backlinks, ContentSeo, Headings, ImageStats, OnPageSeo, SeoBreakdown,
    SocialSignals, TagCheck, TechnicalSeo,
};

use crate::signals::PageSignals;

const TITLE_MAX_CHARS: usize = 60;
const META_MIN_CHARS: usize = 120;
const META_MAX_CHARS: usize = 160;

/// Score a fetched page for `company` served from `website`.
#[must_use]
pub fn score_breakdown(company: &str, website: &str, page: &PageSignals) -> SeoBreakdown {
    SeoBreakdown {
        on_page: on_page(page),
        technical: technical(website, page),
        content: content(company, page),
        backlinks: unknown_backlinks(),
        social: social(page),
    }
}

fn capped(score: u32) -> u8 {
    u8::try_from(score.min(100)).unwrap_or(100)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Ratio of images with alt text; `None` when the page has no images.
fn alt_ratio(page: &PageSignals) -> Option<f64> {
    (page.images_total > 0)
        .then(|| f64::from(page.images_with_alt) / f64::from(page.images_total))
}

pub(crate) fn on_page(page: &PageSignals) -> OnPageSeo {
    let title_len = page.title.chars().count();
    let meta_len = page.meta_description.chars().count();
    let title_optimal = (1..=TITLE_MAX_CHARS).contains(&title_len);
    let meta_optimal = (META_MIN_CHARS..=META_MAX_CHARS).contains(&meta_len);
    let ratio = alt_ratio(page);

    let mut score = 0u32;
    if title_optimal {
        score += 20;
    } else if title_len > 0 {
        score += 10;
    }
    if meta_optimal {
        score += 20;
    } else if meta_len > 0 {
        score += 10;
    }
    if page.h1_count == 1 {
        score += 15;
    } else if page.h1_count > 0 {
        score += 10;
    }
    if page.h2_count > 0 {
        score += 10;
    }
    match ratio {
        Some(r) if r > 0.8 => score += 15,
        Some(r) if r > 0.5 => score += 10,
        _ => {}
    }
    if page.internal_links > 10 {
        score += 20;
    } else if page.internal_links > 5 {
        score += 10;
    }

    let structure = if page.h1_count == 1 && page.h2_count > 0 {
        "Good"
    } else if page.h1_count == 0 {
        "Poor"
    } else {
        "Fair"
    };

    OnPageSeo {
        score: capped(score),
        title_tag: TagCheck {
            exists: title_len > 0,
            length: title_len,
            content: truncate_chars(&page.title, TITLE_MAX_CHARS),
            optimal: title_optimal,
        },
        meta_description: TagCheck {
            exists: meta_len > 0,
            length: meta_len,
            content: truncate_chars(&page.meta_description, META_MAX_CHARS),
            optimal: meta_optimal,
        },
        headings: Headings {
            h1_count: page.h1_count,
            h2_count: page.h2_count,
            structure: structure.to_string(),
        },
        images: ImageStats {
            total: page.images_total,
            with_alt: page.images_with_alt,
            optimized: ratio.is_some_and(|r| r > 0.8),
        },
        internal_links: page.internal_links,
    }
}

/// Page-speed estimate from document size alone.
fn page_speed(html_bytes: usize) -> u8 {
    if html_bytes < 500_000 {
        90
    } else if html_bytes < 1_000_000 {
        75
    } else {
        60
    }
}

pub(crate) fn technical(website: &str, page: &PageSignals) -> TechnicalSeo {
    let ssl = website.trim().to_ascii_lowercase().starts_with("https://");
    let speed = page_speed(page.html_bytes);
    // robots.txt is not fetched; assumed present.
    let robots = true;

    let mut score = 0u32;
    if ssl {
        score += 25;
    }
    if page.has_viewport {
        score += 20;
    }
    if page.mentions_sitemap {
        score += 15;
    }
    if robots {
        score += 10;
    }
    if speed >= 80 {
        score += 30;
    } else if speed >= 60 {
        score += 20;
    }

    TechnicalSeo {
        score: capped(score),
        mobile_friendly: page.has_viewport,
        page_speed: speed,
        ssl_certificate: ssl,
        sitemap: page.mentions_sitemap,
        robots_txt: robots,
    }
}

fn readability(words_per_sentence: f64) -> &'static str {
    if words_per_sentence > 20.0 {
        "Difficult"
    } else if words_per_sentence > 15.0 {
        "Fair"
    } else {
        "Good"
    }
}

pub(crate) fn content(company: &str, page: &PageSignals) -> ContentSeo {
    let words = page.word_count;
    let density = if words > 0 {
        round_to(
            f64::from(page.keyword_occurrences(company)) / f64::from(words) * 100.0,
            2,
        )
    } else {
        0.0
    };
    let readability = readability(page.words_per_sentence());

    let mut score = 0u32;
    score += if words >= 300 {
        30
    } else if words >= 200 {
        20
    } else {
        10
    };
    if (1.0..=3.0).contains(&density) {
        score += 30;
    } else if density > 0.0 {
        score += 15;
    }
    score += match readability {
        "Good" => 25,
        "Fair" => 15,
        _ => 0,
    };
    if page.sentence_count > 10 {
        score += 15;
    }

    ContentSeo {
        score: capped(score),
        keyword_density: density,
        content_length: words,
        readability: readability.to_string(),
    }
}

pub(crate) fn unknown_backlinks() -> Backlinks {
    Backlinks {
        count: 0,
        quality: "Unknown".to_string(),
        domain_authority: 0,
    }
}

pub(crate) fn social(page: &PageSignals) -> SocialSignals {
    SocialSignals {
        facebook_shares: if page.links_facebook { 100 } else { 0 },
        twitter_mentions: if page.links_twitter { 50 } else { 0 },
        linkedin_shares: if page.links_linkedin { 30 } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> PageSignals {
        PageSignals {
            title: "Acme Widgets".into(),
            meta_description: "m".repeat(130),
            h1_count: 1,
            h2_count: 3,
            images_total: 10,
            images_with_alt: 9,
            internal_links: 12,
            has_viewport: true,
            mentions_sitemap: true,
            html_bytes: 20_000,
            ..PageSignals::default()
        }
    }

    #[test]
    fn fully_optimised_page_scores_full_on_page() {
        let s = on_page(&signals());
        assert_eq!(s.score, 100);
        assert!(s.title_tag.optimal);
        assert!(s.meta_description.optimal);
        assert_eq!(s.headings.structure, "Good");
        assert!(s.images.optimized);
    }

    #[test]
    fn long_title_gets_partial_credit_and_truncated_content() {
        let page = PageSignals {
            title: "t".repeat(75),
            ..PageSignals::default()
        };
        let s = on_page(&page);
        assert_eq!(s.score, 10);
        assert_eq!(s.title_tag.length, 75);
        assert_eq!(s.title_tag.content.len(), 60);
        assert!(!s.title_tag.optimal);
        assert_eq!(s.headings.structure, "Poor");
    }

    #[test]
    fn page_without_images_is_not_optimized() {
        let s = on_page(&PageSignals::default());
        assert!(!s.images.optimized);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn technical_rewards_https_and_small_pages() {
        let s = technical("https://acme.test", &signals());
        assert_eq!(s.score, 100);
        assert_eq!(s.page_speed, 90);

        let page = PageSignals {
            html_bytes: 1_200_000,
            ..PageSignals::default()
        };
        let s = technical("http://acme.test", &page);
        assert_eq!(s.page_speed, 60);
        assert_eq!(s.score, 30);
        assert!(!s.ssl_certificate);
        assert!(s.robots_txt);
    }

    #[test]
    fn content_density_and_readability() {
        let page = PageSignals {
            body_text: "acme makes widgets. ".repeat(10),
            word_count: 30,
            sentence_count: 10,
            ..PageSignals::default()
        };
        let s = content("Acme", &page);
        // 10 mentions in 30 words
        assert!((s.keyword_density - 33.33).abs() < 1e-9);
        assert_eq!(s.readability, "Good");
        // 10 (short) + 15 (density > 3) + 25 (good readability)
        assert_eq!(s.score, 50);
    }

    #[test]
    fn empty_content_scores_length_floor_only() {
        let s = content("Acme", &PageSignals::default());
        assert_eq!(s.score, 35);
        assert!(s.keyword_density.abs() < f64::EPSILON);
        assert_eq!(s.content_length, 0);
    }

    #[test]
    fn readability_thresholds() {
        assert_eq!(readability(15.0), "Good");
        assert_eq!(readability(15.5), "Fair");
        assert_eq!(readability(20.0), "Fair");
        assert_eq!(readability(20.1), "Difficult");
    }

    #[test]
    fn social_points_per_network() {
        let page = PageSignals {
            links_facebook: true,
            links_linkedin: true,
            ..PageSignals::default()
        };
        let s = social(&page);
        assert_eq!(
            (s.facebook_shares, s.twitter_mentions, s.linkedin_shares),
            (100, 0, 30)
        );
    }
}
