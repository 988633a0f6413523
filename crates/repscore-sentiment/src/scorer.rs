//! AFINN-style lexicon scorer for review text.

use repscore_core::SentimentLabel;

/// Integer word valences in `[-5, 5]`.
///
/// Keys are lowercase single words. Review vocabulary is weighted more
/// heavily than general prose.
pub(crate) const LEXICON: &[(&str, i32)] = &[
    // Positive
    ("amazing", 4),
    ("awesome", 4),
    ("beautiful", 3),
    ("best", 3),
    ("brilliant", 4),
    ("clean", 2),
    ("comfortable", 2),
    ("convenient", 2),
    ("courteous", 2),
    ("delicious", 3),
    ("delighted", 3),
    ("easy", 1),
    ("efficient", 2),
    ("enjoy", 2),
    ("enjoyed", 2),
    ("excellent", 3),
    ("exceptional", 4),
    ("fabulous", 4),
    ("fantastic", 4),
    ("fair", 2),
    ("fast", 2),
    ("favorite", 2),
    ("fresh", 1),
    ("friendly", 2),
    ("fun", 4),
    ("glad", 3),
    ("good", 3),
    ("great", 3),
    ("happy", 3),
    ("helpful", 2),
    ("honest", 2),
    ("impressed", 3),
    ("impressive", 3),
    ("kind", 2),
    ("like", 2),
    ("liked", 2),
    ("love", 3),
    ("loved", 3),
    ("lovely", 3),
    ("nice", 3),
    ("outstanding", 5),
    ("perfect", 3),
    ("pleasant", 3),
    ("pleased", 3),
    ("polite", 2),
    ("professional", 2),
    ("prompt", 1),
    ("quick", 2),
    ("recommend", 2),
    ("recommended", 2),
    ("reliable", 2),
    ("satisfied", 2),
    ("superb", 5),
    ("thank", 2),
    ("thanks", 2),
    ("top", 2),
    ("welcoming", 2),
    ("wonderful", 4),
    ("worth", 2),
    ("wow", 4),
    // Negative
    ("angry", -3),
    ("annoyed", -2),
    ("annoying", -2),
    ("avoid", -1),
    ("awful", -3),
    ("bad", -3),
    ("broken", -1),
    ("careless", -2),
    ("cheated", -3),
    ("cold", -1),
    ("complain", -2),
    ("complaint", -2),
    ("confused", -2),
    ("cracked", -2),
    ("dirty", -2),
    ("disappointed", -2),
    ("disappointing", -2),
    ("disaster", -2),
    ("disgusting", -3),
    ("dishonest", -2),
    ("expensive", -1),
    ("fail", -2),
    ("failed", -2),
    ("fraud", -4),
    ("frustrated", -2),
    ("frustrating", -2),
    ("hate", -3),
    ("hated", -3),
    ("horrible", -3),
    ("ignored", -2),
    ("incompetent", -2),
    ("lazy", -1),
    ("mess", -2),
    ("mediocre", -3),
    ("nasty", -3),
    ("overpriced", -3),
    ("pathetic", -2),
    ("poor", -2),
    ("problem", -2),
    ("rude", -2),
    ("sad", -2),
    ("scam", -2),
    ("slow", -2),
    ("sorry", -1),
    ("stupid", -2),
    ("terrible", -3),
    ("ugly", -3),
    ("unacceptable", -2),
    ("unfortunately", -2),
    ("unhappy", -2),
    ("unprofessional", -2),
    ("upset", -2),
    ("useless", -2),
    ("waste", -1),
    ("wasted", -2),
    ("worse", -3),
    ("worst", -3),
    ("wrong", -2),
];

/// Words that flip the valence of the word immediately after them.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "isn't",
    "isnt", "wasn't", "wasnt", "won't", "wont", "can't", "cant", "cannot", "hardly",
];

const POSITIVE_THRESHOLD: i32 = 2;
const NEGATIVE_THRESHOLD: i32 = -2;

/// Result of scoring one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Sum of word valences.
    pub score: i32,
    /// `score` divided by the token count; `0.0` for empty text.
    pub comparative: f64,
}

/// Label for an integer score: above 2 positive, below -2 negative.
#[must_use]
pub fn label_for(score: i32) -> SentimentLabel {
    if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn valence(word: &str) -> Option<i32> {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, weight)| weight)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
                .replace('\u{2019}', "'")
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Classify a text.
///
/// Tokens are lowercased and stripped of surrounding punctuation; a negator
/// directly before a scored word flips that word's sign.
#[must_use]
pub fn classify(text: &str) -> Classification {
    let tokens = tokenize(text);
    let mut score = 0;
    for (i, token) in tokens.iter().enumerate() {
        let Some(weight) = valence(token) else {
            continue;
        };
        let negated = i > 0 && NEGATORS.contains(&tokens[i - 1].as_str());
        score += if negated { -weight } else { weight };
    }

    let comparative = if tokens.is_empty() {
        0.0
    } else {
        f64::from(score) / tokens.len() as f64
    };

    Classification {
        label: label_for(score),
        score,
        comparative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_neutral_zero() {
        let c = classify("");
        assert_eq!(c.score, 0);
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert!(c.comparative.abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_text_is_neutral() {
        assert_eq!(classify("the quick brown fox").label, SentimentLabel::Neutral);
    }

    #[test]
    fn great_service_is_positive() {
        let c = classify("great service");
        assert_eq!(c.score, 3);
        assert_eq!(c.label, SentimentLabel::Positive);
        assert!((c.comparative - 1.5).abs() < 1e-9);
    }

    #[test]
    fn terrible_never_again_is_negative() {
        let c = classify("terrible, never again");
        assert_eq!(c.score, -3);
        assert_eq!(c.label, SentimentLabel::Negative);
    }

    #[test]
    fn thresholds_are_exclusive() {
        // "nice" = 3, "good" = 3, "like" = 2
        assert_eq!(classify("like").label, SentimentLabel::Neutral);
        assert_eq!(classify("nice").label, SentimentLabel::Positive);
        assert_eq!(classify("poor").label, SentimentLabel::Neutral);
        assert_eq!(classify("bad").label, SentimentLabel::Negative);
    }

    #[test]
    fn negator_flips_next_word() {
        assert_eq!(classify("not good").score, -3);
        assert_eq!(classify("wasn't bad at all").score, 3);
        // Negation only reaches the adjacent token.
        assert_eq!(classify("not very good").score, 3);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(classify("GREAT!!!").score, 3);
        assert_eq!(classify("\"Excellent.\"").score, 3);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Friendly staff but the food was cold and overpriced";
        assert_eq!(classify(text), classify(text));
    }
}
