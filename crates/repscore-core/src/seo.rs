//! SEO breakdown types shared by the scorer and the analysis output contract.

use serde::{Deserialize, Serialize};

/// Letter grade of the SEO composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Map a composite score to a grade using inclusive lower bounds.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::APlus
        } else if score >= 80.0 {
            Grade::A
        } else if score >= 70.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCheck {
    pub exists: bool,
    pub length: usize,
    pub content: String,
    pub optimal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headings {
    pub h1_count: u32,
    pub h2_count: u32,
    pub structure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: u32,
    pub with_alt: u32,
    pub optimized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnPageSeo {
    pub score: u8,
    pub title_tag: TagCheck,
    pub meta_description: TagCheck,
    pub headings: Headings,
    pub images: ImageStats,
    pub internal_links: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSeo {
    pub score: u8,
    pub mobile_friendly: bool,
    pub page_speed: u8,
    pub ssl_certificate: bool,
    pub sitemap: bool,
    pub robots_txt: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSeo {
    pub score: u8,
    /// Company-name mentions per 100 words, 2-decimal rounding.
    pub keyword_density: f64,
    pub content_length: u32,
    pub readability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlinks {
    pub count: u32,
    pub quality: String,
    /// 0 means "unknown".
    pub domain_authority: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSignals {
    pub facebook_shares: u32,
    pub twitter_mentions: u32,
    pub linkedin_shares: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoBreakdown {
    #[serde(rename = "onPageSEO")]
    pub on_page: OnPageSeo,
    #[serde(rename = "technicalSEO")]
    pub technical: TechnicalSeo,
    #[serde(rename = "contentSEO")]
    pub content: ContentSeo,
    pub backlinks: Backlinks,
    #[serde(rename = "socialSignals")]
    pub social: SocialSignals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub overall_score: u8,
    pub grade: Grade,
    pub breakdown: SeoBreakdown,
    pub recommendations: Vec<String>,
}
