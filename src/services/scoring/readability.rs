// Readability
// Flesch reading ease and Flesch-Kincaid grade, using the shared syllable estimate

use crate::models::ReadabilityResult;
use crate::services::text_processor::{count_syllables, split_sentences, tokenize_words};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn analyze(text: &str) -> ReadabilityResult {
    let words = tokenize_words(text);
    if words.is_empty() {
        return ReadabilityResult {
            feedback: "No text provided for readability analysis.".to_string(),
            ..Default::default()
        };
    }

    let sentence_count = split_sentences(text).len().max(1) as f64;
    let word_count = words.len() as f64;
    let syllables: usize = words.iter().map(|w| count_syllables(w.as_str())).sum();

    let words_per_sentence = word_count / sentence_count;
    let syllables_per_word = syllables as f64 / word_count;

    let ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    let score = round1(ease.clamp(0.0, 100.0));

    let feedback = if score >= 70.0 {
        "Very easy to read. For academic writing, consider more developed sentences and precise terminology."
    } else if score >= 50.0 {
        "Readable for a general audience, with a good balance of clarity and complexity."
    } else if score >= 30.0 {
        "Fairly difficult to read, which is typical for academic prose. Check that long sentences stay clear."
    } else {
        "Very difficult to read. Break up long sentences and prefer plainer words where possible."
    };

    ReadabilityResult {
        score,
        grade_level: round1(grade.max(0.0)),
        avg_sentence_length: round1(words_per_sentence),
        avg_syllables_per_word: round1(syllables_per_word),
        feedback: feedback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let result = analyze("");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.grade_level, 0.0);
        assert!(!result.feedback.is_empty());
    }

    #[test]
    fn test_simple_text_is_easy() {
        let result = analyze("The cat sat. The dog ran. We had fun.");
        assert!(result.score >= 70.0);
        assert_eq!(result.avg_sentence_length, 3.0);
    }

    #[test]
    fn test_dense_text_is_hard() {
        let result = analyze(
            "Institutional interdependencies fundamentally complicate intergovernmental \
             accountability, notwithstanding considerable methodological sophistication.",
        );
        assert!(result.score < 30.0);
        assert!(result.grade_level > 12.0);
    }
}
