// Plagiarism Phrase Matcher
//
// NOT a plagiarism detector. There is no corpus and no similarity search here:
// the essay is checked for a handful of topic keywords, and each keyword found
// produces a canned "common phrasing" match from the lexicon's phrase-source table.
// It exists so a report still has an originality section when no LLM provider is
// configured. Anything that needs real similarity checking must go to a provider.

use crate::models::{PlagiarismMatch, PlagiarismResult};
use crate::services::text_processor::count_phrase;

use super::lexicon::Lexicon;

const BASE_ORIGINALITY: f64 = 95.0;
/// Match text length is divided by this to weight the penalty
const LENGTH_WEIGHT_DIVISOR: f64 = 50.0;

const RECOMMENDATION: &str =
    "This is a commonly used formulation; cite the source or rephrase it in your own words.";

/// Penalty a single match contributes: `percentage * chars(text) / 50`
pub fn match_penalty(m: &PlagiarismMatch) -> f64 {
    m.match_percentage as f64 * m.text.chars().count() as f64 / LENGTH_WEIGHT_DIVISOR
}

pub fn originality_from_matches(matches: &[PlagiarismMatch]) -> u8 {
    let penalty: f64 = matches.iter().map(match_penalty).sum();
    (BASE_ORIGINALITY - penalty).max(0.0).round().min(100.0) as u8
}

pub fn check(text: &str) -> PlagiarismResult {
    check_with(text, Lexicon::standard())
}

pub fn check_with(text: &str, lexicon: &Lexicon) -> PlagiarismResult {
    let lower = text.to_lowercase();

    let matches: Vec<PlagiarismMatch> = lexicon
        .phrase_sources
        .iter()
        .filter(|source| count_phrase(&lower, source.keyword) > 0)
        .map(|source| PlagiarismMatch {
            text: source.text.to_string(),
            match_percentage: source.match_percentage,
            source: Some(source.source.to_string()),
            url: Some(source.url.to_string()),
            recommendation: Some(RECOMMENDATION.to_string()),
        })
        .collect();

    PlagiarismResult {
        originality_score: originality_from_matches(&matches),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::lexicon::PhraseSource;

    #[test]
    fn test_no_triggers_keeps_base_score() {
        let result = check("My grandmother grew tomatoes every summer.");
        assert_eq!(result.originality_score, 95);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let result = check("");
        assert_eq!(result.originality_score, 95);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_trigger_is_case_insensitive() {
        let result = check("CLIMATE CHANGE is real.");
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].match_percentage, 18);
        assert!(result.matches[0].source.is_some());
        assert!(result.originality_score < 95);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let result = check(
            "The digital revolution, artificial intelligence, climate change and social media.",
        );
        assert_eq!(result.matches.len(), 4);
        assert_eq!(result.originality_score, 0);
    }

    #[test]
    fn test_custom_sources() {
        static SOURCES: &[PhraseSource] = &[PhraseSource {
            keyword: "blockchain",
            text: "0123456789",
            match_percentage: 50,
            source: "Test",
            url: "https://example.org",
        }];
        let lexicon = Lexicon {
            phrase_sources: SOURCES,
            ..Lexicon::default()
        };
        // 50 * 10 / 50 = 10
        let result = check_with("Blockchain everywhere.", &lexicon);
        assert_eq!(result.originality_score, 85);
    }
}
