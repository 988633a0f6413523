//! Rule-based SEO recommendations in fixed order.

use repscore_core::SeoBreakdown;

pub const SEO_LOOKS_GOOD: &str = "Your SEO looks good! Keep maintaining it.";

const ON_PAGE_THRESHOLD: u8 = 80;
const TECHNICAL_THRESHOLD: u8 = 80;
const CONTENT_THRESHOLD: u8 = 75;
const MIN_DOMAIN_AUTHORITY: u8 = 40;

/// Recommendations for a breakdown; never empty.
#[must_use]
pub fn seo_recommendations(b: &SeoBreakdown) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    if b.on_page.score < ON_PAGE_THRESHOLD {
        if !b.on_page.title_tag.exists {
            out.push("Add a title tag (50-60 characters recommended)");
        }
        if !b.on_page.meta_description.exists {
            out.push("Add a meta description (120-160 characters recommended)");
        }
        if b.on_page.headings.h1_count != 1 {
            out.push("Ensure you have exactly one H1 tag on the page");
        }
        if !b.on_page.images.optimized {
            out.push("Add alt text to all images for better SEO");
        }
    }

    if b.technical.score < TECHNICAL_THRESHOLD {
        if !b.technical.ssl_certificate {
            out.push("Install SSL certificate (HTTPS) for better security and SEO");
        }
        if b.technical.page_speed < 80 {
            out.push("Optimize page loading speed - compress images and minify code");
        }
        if !b.technical.mobile_friendly {
            out.push("Add viewport meta tag for mobile responsiveness");
        }
    }

    if b.content.score < CONTENT_THRESHOLD {
        if b.content.content_length < 300 {
            out.push("Increase content length to at least 300 words");
        }
        if b.content.keyword_density < 1.0 {
            out.push("Improve keyword density (aim for 1-3%)");
        }
    }

    if b.backlinks.domain_authority < MIN_DOMAIN_AUTHORITY {
        out.push("Build more high-quality backlinks to improve domain authority");
    }

    if out.is_empty() {
        out.push(SEO_LOOKS_GOOD);
    }
    out.into_iter().map(str::to_string).collect()
}
