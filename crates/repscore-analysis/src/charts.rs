//! Chart-ready projections. Pure functions of the summary, review list, and
//! SEO report.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use repscore_core::{
    ChartSlice, Charts, ReviewRecord, SentimentLabel, SentimentSummary, SeoReport, TimelinePoint,
};

const GREEN: &str = "#10b981";
const AMBER: &str = "#f59e0b";
const RED: &str = "#ef4444";

#[must_use]
pub fn build_charts(
    summary: &SentimentSummary,
    reviews: &[ReviewRecord],
    seo: &SeoReport,
) -> Charts {
    Charts {
        sentiment_distribution: sentiment_chart(summary),
        rating_distribution: rating_chart(reviews),
        seo_breakdown: seo_chart(seo),
        timeline: timeline_chart(reviews),
    }
}

#[must_use]
pub fn sentiment_chart(summary: &SentimentSummary) -> Vec<ChartSlice> {
    let d = summary.sentiment_distribution;
    vec![
        ChartSlice::new("Positive", d.positive, GREEN),
        ChartSlice::new("Neutral", d.neutral, AMBER),
        ChartSlice::new("Negative", d.negative, RED),
    ]
}

/// Five buckets, 1 to 5 stars, always present. Ratings that round outside
/// the range are not counted.
#[must_use]
pub fn rating_chart(reviews: &[ReviewRecord]) -> Vec<ChartSlice> {
    let mut counts = [0u32; 5];
    for review in reviews {
        let rounded = review.rating.round();
        if (1.0..=5.0).contains(&rounded) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bucket = rounded as usize - 1;
            counts[bucket] += 1;
        }
    }

    counts
        .iter()
        .zip(1u32..)
        .map(|(&count, stars)| {
            let name = if stars == 1 {
                "1 Star".to_string()
            } else {
                format!("{stars} Stars")
            };
            let fill = match stars {
                4.. => GREEN,
                3 => AMBER,
                _ => RED,
            };
            ChartSlice::new(name, f64::from(count), fill)
        })
        .collect()
}

#[must_use]
pub fn seo_chart(seo: &SeoReport) -> Vec<ChartSlice> {
    let b = &seo.breakdown;
    vec![
        ChartSlice::new("On-Page SEO", f64::from(b.on_page.score), "#3b82f6"),
        ChartSlice::new("Technical SEO", f64::from(b.technical.score), "#8b5cf6"),
        ChartSlice::new("Content SEO", f64::from(b.content.score), "#ec4899"),
        ChartSlice::new(
            "Backlinks",
            f64::from(b.backlinks.domain_authority),
            "#f59e0b",
        ),
    ]
}

/// Per-month sentiment counts, ascending by `YYYY-MM`.
///
/// A review is dated by its own date, or by its storage time when it has no
/// date. A date that does not parse drops the review from the timeline.
#[must_use]
pub fn timeline_chart(reviews: &[ReviewRecord]) -> Vec<TimelinePoint> {
    let mut months: BTreeMap<String, (u32, u32, u32)> = BTreeMap::new();
    for review in reviews {
        let when = match review.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_review_date(raw),
            _ => review.created_at,
        };
        let Some(when) = when else {
            continue;
        };

        let entry = months.entry(when.format("%Y-%m").to_string()).or_default();
        match review.sentiment {
            SentimentLabel::Positive => entry.0 += 1,
            SentimentLabel::Negative => entry.1 += 1,
            SentimentLabel::Neutral => entry.2 += 1,
        }
    }

    months
        .into_iter()
        .map(|(month, (positive, negative, neutral))| TimelinePoint {
            month,
            positive,
            negative,
            neutral,
        })
        .collect()
}

/// Parse the date formats review sources emit: RFC 3339, `YYYY-MM-DD`, and
/// `YYYY-MM-DD HH:MM:SS` (UTC assumed).
fn parse_review_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use repscore_core::Platform;

    fn review(rating: f64, label: SentimentLabel, date: Option<&str>) -> ReviewRecord {
        let mut r = ReviewRecord::new(
            "r",
            Platform::Google,
            "A",
            rating,
            "text",
            date.map(str::to_string),
        );
        r.sentiment = label;
        r
    }

    #[test]
    fn rating_chart_always_has_five_ascending_buckets() {
        let chart = rating_chart(&[]);
        let names: Vec<&str> = chart.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["1 Star", "2 Stars", "3 Stars", "4 Stars", "5 Stars"]);
        assert!(chart.iter().all(|s| s.value.abs() < f64::EPSILON));
        let fills: Vec<&str> = chart.iter().map(|s| s.fill.as_str()).collect();
        assert_eq!(fills, [RED, RED, AMBER, GREEN, GREEN]);
    }

    #[test]
    fn rating_chart_rounds_ratings() {
        let reviews = [
            review(4.6, SentimentLabel::Positive, None),
            review(4.4, SentimentLabel::Positive, None),
            review(1.0, SentimentLabel::Negative, None),
        ];
        let values: Vec<f64> = rating_chart(&reviews).iter().map(|s| s.value).collect();
        assert_eq!(values, [1.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn timeline_is_ascending_and_skips_unparsable_dates() {
        let mut undated = review(3.0, SentimentLabel::Neutral, None);
        undated.created_at = Some(Utc.with_ymd_and_hms(2023, 12, 5, 0, 0, 0).unwrap());

        let mut garbled = review(3.0, SentimentLabel::Neutral, Some("last tuesday"));
        garbled.created_at = Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());

        let reviews = [
            review(5.0, SentimentLabel::Positive, Some("2024-02-03 10:00:00")),
            review(1.0, SentimentLabel::Negative, Some("2024-01-15")),
            review(5.0, SentimentLabel::Positive, Some("2024-01-10T12:00:00.000Z")),
            undated,
            garbled,
            review(2.0, SentimentLabel::Negative, None),
        ];

        let timeline = timeline_chart(&reviews);
        let months: Vec<&str> = timeline.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, ["2023-12", "2024-01", "2024-02"]);
        assert_eq!(
            (timeline[1].positive, timeline[1].negative, timeline[1].neutral),
            (1, 1, 0)
        );
        assert_eq!(timeline[0].neutral, 1);
    }

    #[test]
    fn seo_chart_uses_domain_authority_for_backlinks() {
        let chart = seo_chart(&repscore_seo::default_report());
        let names: Vec<&str> = chart.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["On-Page SEO", "Technical SEO", "Content SEO", "Backlinks"]
        );
        assert!(chart.iter().all(|s| (s.value - 50.0).abs() < f64::EPSILON));
    }
}
