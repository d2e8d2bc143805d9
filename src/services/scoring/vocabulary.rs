// Vocabulary Analysis
// Sophistication, variety, spelling and transition usage of an essay's word choice

use crate::models::{AcademicLevel, Typo, VocabularyResult};
use crate::services::text_processor::{
    context_window, count_phrase, count_syllables, split_sentences, tokenize_words, word_spans,
};
use std::collections::{HashMap, HashSet};

use super::lexicon::Lexicon;

const TYPO_CONTEXT_CHARS: usize = 20;
/// Share of the transition catalogue that counts as full variety
const TRANSITION_VARIETY_BASIS: f64 = 0.3;
const OVERUSED_TRANSITION_MIN: usize = 3;
const OVERUSED_WORD_MIN: f64 = 3.0;
const OVERUSED_WORD_SHARE: f64 = 0.005;
const MAX_SUBSTITUTION_SUGGESTIONS: usize = 3;
const MAX_ACADEMIC_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Sophistication {
    pub avg_word_length: f64,
    pub complex_ratio: f64,
    pub advanced_ratio: f64,
    pub score: f64,
    /// Distinct advanced words in order of first use
    pub advanced_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionUsage {
    /// (phrase, occurrences) for every phrase used at least once, catalogue order
    pub used: Vec<(&'static str, usize)>,
    pub category_counts: Vec<(&'static str, usize)>,
    pub total: usize,
    /// Distinct phrases used over 30% of the catalogue, capped at 1
    pub variety: f64,
    /// Occurrences per 1000 words
    pub density: f64,
    pub overused: Vec<(&'static str, usize)>,
    pub missing_categories: Vec<&'static str>,
}

pub fn lexical_density(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    unique.len() as f64 / words.len() as f64
}

fn is_advanced(word: &str, syllables: usize, lexicon: &Lexicon) -> bool {
    word.chars().count() >= 8 || syllables >= 4 || lexicon.is_academic_term(word)
}

pub fn sophistication(words: &[String], lexicon: &Lexicon) -> Sophistication {
    let content: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| lexicon.is_content_word(w))
        .collect();

    if content.is_empty() {
        return Sophistication {
            avg_word_length: 0.0,
            complex_ratio: 0.0,
            advanced_ratio: 0.0,
            score: 0.0,
            advanced_terms: Vec::new(),
        };
    }

    let n = content.len() as f64;
    let mut total_len = 0usize;
    let mut complex = 0usize;
    let mut advanced = 0usize;
    let mut advanced_terms: Vec<String> = Vec::new();

    for word in &content {
        let syllables = count_syllables(word);
        total_len += word.chars().count();
        if syllables >= 3 {
            complex += 1;
        }
        if is_advanced(word, syllables, lexicon) {
            advanced += 1;
            if !advanced_terms.iter().any(|t| t == word) {
                advanced_terms.push(word.to_string());
            }
        }
    }

    let avg_word_length = total_len as f64 / n;
    let complex_ratio = complex as f64 / n;
    let advanced_ratio = advanced as f64 / n;
    let score = (avg_word_length * 6.0 + complex_ratio * 40.0 + advanced_ratio * 40.0).min(100.0);

    Sophistication {
        avg_word_length,
        complex_ratio,
        advanced_ratio,
        score,
        advanced_terms,
    }
}

/// Dictionary misspellings with a +-20 char window from the sentence they occur in
pub fn find_typos(text: &str, lexicon: &Lexicon) -> Vec<Typo> {
    let mut typos = Vec::new();
    for sentence in split_sentences(text) {
        for span in word_spans(&sentence) {
            if let Some(fixes) = lexicon.corrections_for(&span.word) {
                typos.push(Typo {
                    word: span.word.clone(),
                    suggestions: fixes.iter().map(|s| s.to_string()).collect(),
                    context: context_window(&sentence, span.byte_start, span.byte_end, TYPO_CONTEXT_CHARS),
                });
            }
        }
    }
    typos
}

pub fn transition_usage(text: &str, word_count: usize, lexicon: &Lexicon) -> TransitionUsage {
    let lower = text.to_lowercase();
    let mut used = Vec::new();
    let mut category_counts = Vec::new();
    let mut missing_categories = Vec::new();
    let mut total = 0usize;

    for category in lexicon.transition_categories {
        let mut category_total = 0usize;
        for phrase in category.phrases {
            let count = count_phrase(&lower, phrase);
            if count > 0 {
                used.push((*phrase, count));
                category_total += count;
            }
        }
        if category_total == 0 {
            missing_categories.push(category.name);
        }
        category_counts.push((category.name, category_total));
        total += category_total;
    }

    let catalogued = lexicon.transition_phrase_count() as f64 * TRANSITION_VARIETY_BASIS;
    let variety = if catalogued > 0.0 {
        (used.len() as f64 / catalogued).min(1.0)
    } else {
        0.0
    };
    let density = if word_count == 0 {
        0.0
    } else {
        total as f64 / word_count as f64 * 1000.0
    };

    let mut overused: Vec<(&'static str, usize)> = used
        .iter()
        .filter(|(_, count)| *count >= OVERUSED_TRANSITION_MIN)
        .copied()
        .collect();
    overused.sort_by(|a, b| b.1.cmp(&a.1));

    TransitionUsage {
        used,
        category_counts,
        total,
        variety,
        density,
        overused,
        missing_categories,
    }
}

/// Content words used at least max(3, 0.5% of the word count) times, most frequent first
pub fn overused_words(words: &[String], lexicon: &Lexicon) -> Vec<(String, usize)> {
    let threshold = OVERUSED_WORD_MIN.max(words.len() as f64 * OVERUSED_WORD_SHARE);
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in words.iter().map(String::as_str).filter(|w| lexicon.is_content_word(w)) {
        *freq.entry(w).or_insert(0) += 1;
    }

    let mut overused: Vec<(String, usize)> = freq
        .into_iter()
        .filter(|(_, c)| *c as f64 >= threshold)
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    overused.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    overused
}

fn build_suggestions(
    text_lower: &str,
    overused: &[(String, usize)],
    level: AcademicLevel,
    transitions: &TransitionUsage,
    lexicon: &Lexicon,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    for (word, count) in overused.iter().take(MAX_SUBSTITUTION_SUGGESTIONS) {
        match lexicon.synonyms_for(word) {
            Some(alts) => suggestions.push(format!(
                "Replace some uses of \"{}\" (used {} times) with alternatives such as {}.",
                word,
                count,
                alts.join(", ")
            )),
            None => suggestions.push(format!(
                "The word \"{}\" appears {} times; vary it with synonyms or restructure the sentences.",
                word, count
            )),
        }
    }

    if !level.is_elevated() {
        lexicon
            .academic_alternatives
            .iter()
            .filter(|(basic, _)| count_phrase(text_lower, basic) > 0)
            .take(MAX_ACADEMIC_SUGGESTIONS)
            .for_each(|(basic, academic)| {
                suggestions.push(format!(
                    "Consider replacing \"{}\" with the more academic \"{}\".",
                    basic, academic
                ));
            });
    }

    if let Some((phrase, count)) = transitions.overused.first() {
        let alternatives: Vec<&str> = lexicon
            .category_of(phrase)
            .map(|c| c.phrases.iter().copied().filter(|p| p != phrase).take(3).collect())
            .unwrap_or_default();
        suggestions.push(format!(
            "Vary the transition \"{}\" (used {} times); try {} instead.",
            phrase,
            count,
            alternatives.join(", ")
        ));
    }

    if !transitions.missing_categories.is_empty() {
        let examples: Vec<&str> = transitions
            .missing_categories
            .iter()
            .filter_map(|name| {
                lexicon
                    .transition_categories
                    .iter()
                    .find(|c| c.name == *name)
                    .and_then(|c| c.phrases.first().copied())
            })
            .collect();
        suggestions.push(format!(
            "Add transitions for {} relationships (for example: {}).",
            transitions.missing_categories.join(", "),
            examples.join(", ")
        ));
    }

    suggestions
}

fn build_feedback(score: u8, level: AcademicLevel, density: f64, transitions: &TransitionUsage) -> String {
    let opening = if score >= 85 {
        "Excellent vocabulary: word choice is sophisticated, precise and varied."
    } else if score >= 75 {
        "Strong vocabulary with good variety and an academic tone."
    } else if score >= 65 {
        "Good vocabulary overall, with room to refine word choice."
    } else if score >= 50 {
        "Adequate vocabulary, though word choice is often basic or repetitive."
    } else {
        "Limited vocabulary: focus on variety and precision in word choice."
    };

    let variety = if density >= 0.6 {
        " Lexical variety is high."
    } else if density < 0.45 {
        " Many words are repeated throughout the essay."
    } else {
        ""
    };

    let flow = if transitions.variety >= 0.7 {
        " Transitions are varied and connect ideas well."
    } else if transitions.variety < 0.3 {
        " Transitions are sparse or repetitive."
    } else {
        ""
    };

    let article = if level == AcademicLevel::Basic { "a" } else { "an" };
    format!(
        "{}{} The vocabulary reads at {} {} academic level.{}",
        opening,
        variety,
        article,
        level.as_str(),
        flow
    )
}

fn build_strengths(
    density: f64,
    level: AcademicLevel,
    soph: &Sophistication,
    transitions: &TransitionUsage,
    typos: &[Typo],
) -> Vec<String> {
    let mut strengths = Vec::new();
    if density >= 0.6 {
        strengths.push("Rich lexical variety".to_string());
    }
    if level.is_elevated() {
        strengths.push("Confident use of academic vocabulary".to_string());
    }
    if soph.advanced_terms.len() >= 5 {
        strengths.push("Uses discipline-specific terminology".to_string());
    }
    if transitions.variety >= 0.7 {
        strengths.push("Wide range of transitional phrases".to_string());
    } else if transitions.variety >= 0.5 {
        strengths.push("Good use of transitional phrases".to_string());
    }
    if typos.is_empty() {
        strengths.push("No common misspellings detected".to_string());
    }
    strengths
}

fn build_improvement_areas(
    density: f64,
    level: AcademicLevel,
    transitions: &TransitionUsage,
    typos: &[Typo],
    overused: &[(String, usize)],
) -> Vec<String> {
    let mut areas = Vec::new();
    if density < 0.45 {
        areas.push("Reduce word repetition; lexical variety is low".to_string());
    } else if density < 0.5 {
        areas.push("Increase lexical variety".to_string());
    }
    if !level.is_elevated() {
        areas.push("Incorporate more precise, academic vocabulary".to_string());
    }
    if transitions.variety < 0.3 {
        areas.push("Use a broader range of transitions to connect ideas".to_string());
    }
    if !transitions.overused.is_empty() {
        areas.push("Vary repeated transitional phrases".to_string());
    }
    if !typos.is_empty() {
        areas.push(format!("Correct {} spelling error(s)", typos.len()));
    }
    if !overused.is_empty() {
        let words: Vec<&str> = overused.iter().take(5).map(|(w, _)| w.as_str()).collect();
        areas.push(format!("Avoid overusing: {}", words.join(", ")));
    }
    areas
}

fn empty_result() -> VocabularyResult {
    VocabularyResult {
        score: 0,
        feedback: "No text provided for vocabulary analysis.".to_string(),
        academic_level: AcademicLevel::Basic,
        ..Default::default()
    }
}

pub fn analyze(text: &str) -> VocabularyResult {
    analyze_with(text, Lexicon::standard())
}

pub fn analyze_with(text: &str, lexicon: &Lexicon) -> VocabularyResult {
    let words = tokenize_words(text);
    if words.is_empty() {
        return empty_result();
    }

    let density = lexical_density(&words);
    let soph = sophistication(&words, lexicon);
    let level = AcademicLevel::from_sophistication(soph.score);
    let typos = find_typos(text, lexicon);
    let transitions = transition_usage(text, words.len(), lexicon);
    let overused = overused_words(&words, lexicon);

    let typo_bonus = if typos.is_empty() { 10.0 } else { 0.0 };
    let raw = density * 100.0 * 0.2
        + soph.score * 0.5
        + typo_bonus * 0.1
        + transitions.variety * 100.0 * 0.2;
    let score = raw.round().clamp(0.0, 100.0) as u8;

    let lower = text.to_lowercase();
    let suggestions = build_suggestions(&lower, &overused, level, &transitions, lexicon);
    let feedback = build_feedback(score, level, density, &transitions);
    let strengths = build_strengths(density, level, &soph, &transitions, &typos);
    let improvement_areas = build_improvement_areas(density, level, &transitions, &typos, &overused);

    VocabularyResult {
        score,
        feedback,
        advanced: soph.advanced_terms,
        suggestions,
        uniqueness: (density * 100.0).round().clamp(0.0, 100.0) as u8,
        academic_level: level,
        improvement_areas,
        strengths,
        typos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize_words(text)
    }

    #[test]
    fn test_empty_text() {
        let result = analyze("");
        assert_eq!(result.score, 0);
        assert_eq!(result.academic_level, AcademicLevel::Basic);
        assert!(result.advanced.is_empty());
        assert!(result.suggestions.is_empty());
        assert!(result.typos.is_empty());
        assert!(result.strengths.is_empty());
        assert!(result.improvement_areas.is_empty());
    }

    #[test]
    fn test_typo_context_and_suggestion() {
        let typos = find_typos("Teh cat sat on teh mat.", Lexicon::standard());
        assert_eq!(typos.len(), 2);
        assert_eq!(typos[0].word, "teh");
        assert_eq!(typos[0].suggestions, vec!["the"]);
        assert_eq!(typos[0].context, "Teh cat sat on teh mat");
        assert_eq!(typos[1].context, "Teh cat sat on teh mat");
    }

    #[test]
    fn test_sophistication_ignores_function_and_short_words() {
        let soph = sophistication(&words("the cat and a dog"), Lexicon::standard());
        assert_eq!(soph.score, 0.0);
        assert!(soph.advanced_terms.is_empty());
    }

    #[test]
    fn test_sophistication_flags_advanced_terms() {
        let soph = sophistication(
            &words("The methodology reveals a paradigm of remarkable interdisciplinary capitalism"),
            Lexicon::standard(),
        );
        assert!(soph.advanced_terms.contains(&"methodology".to_string()));
        assert!(soph.advanced_terms.contains(&"paradigm".to_string()));
        assert!(soph.advanced_terms.contains(&"capitalism".to_string()));
        assert!(soph.score > 60.0);
    }

    #[test]
    fn test_transition_usage() {
        let text = "However, it rained. However, we went out. However, we got wet. For example, my shoes.";
        let usage = transition_usage(text, tokenize_words(text).len(), Lexicon::standard());
        assert_eq!(usage.total, 4);
        assert_eq!(usage.overused, vec![("however", 3)]);
        assert_eq!(usage.missing_categories, vec!["addition", "cause", "emphasis"]);
        assert!((usage.variety - 2.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_variety_caps_at_one() {
        let text = "furthermore moreover additionally however nevertheless conversely therefore hence thus namely indeed notably";
        let usage = transition_usage(text, 12, Lexicon::standard());
        assert_eq!(usage.variety, 1.0);
        assert!(usage.missing_categories.is_empty());
    }

    #[test]
    fn test_overused_words_threshold() {
        let w = words("change change change policy policy things things things things");
        let overused = overused_words(&w, Lexicon::standard());
        assert_eq!(
            overused,
            vec![("things".to_string(), 4), ("change".to_string(), 3)]
        );
    }

    #[test]
    fn test_suggestions_use_synonym_tables() {
        let text = "People think people matter. People help people. The problem is people.";
        let result = analyze(text);
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.contains("\"people\"") && s.contains("individuals")));
    }

    #[test]
    fn test_basic_text_gets_academic_alternatives() {
        let result = analyze("We use it. We get it. It is big and good.");
        assert!(!result.academic_level.is_elevated());
        let academic: Vec<_> = result
            .suggestions
            .iter()
            .filter(|s| s.starts_with("Consider replacing"))
            .collect();
        assert_eq!(academic.len(), 3);
    }

    #[test]
    fn test_score_and_uniqueness_in_range() {
        let text = "Comprehensive methodological frameworks facilitate interdisciplinary synthesis. \
                    Nevertheless, empirical verification remains indispensable.";
        let result = analyze(text);
        assert!(result.score <= 100);
        assert!(result.uniqueness <= 100);
        assert_eq!(result.uniqueness, 100);
        assert!(result.academic_level.is_elevated());
    }

    fn usage_with_variety(variety: f64) -> TransitionUsage {
        TransitionUsage {
            used: Vec::new(),
            category_counts: Vec::new(),
            total: 0,
            variety,
            density: 0.0,
            overused: Vec::new(),
            missing_categories: Vec::new(),
        }
    }

    fn plain_sophistication() -> Sophistication {
        Sophistication {
            avg_word_length: 5.0,
            complex_ratio: 0.0,
            advanced_ratio: 0.0,
            score: 30.0,
            advanced_terms: Vec::new(),
        }
    }

    #[test]
    fn test_feedback_score_bands() {
        let usage = usage_with_variety(0.5);
        let cases = [
            (100, "Excellent vocabulary"),
            (85, "Excellent vocabulary"),
            (84, "Strong vocabulary"),
            (75, "Strong vocabulary"),
            (74, "Good vocabulary overall"),
            (65, "Good vocabulary overall"),
            (64, "Adequate vocabulary"),
            (50, "Adequate vocabulary"),
            (49, "Limited vocabulary"),
            (0, "Limited vocabulary"),
        ];
        for (score, opening) in cases {
            let feedback = build_feedback(score, AcademicLevel::Intermediate, 0.5, &usage);
            assert!(feedback.starts_with(opening), "score {}: {}", score, feedback);
        }
    }

    #[test]
    fn test_feedback_density_and_variety_bands() {
        let mid = usage_with_variety(0.5);
        let high = build_feedback(70, AcademicLevel::Advanced, 0.6, &mid);
        assert!(high.contains("Lexical variety is high."));
        let neutral = build_feedback(70, AcademicLevel::Advanced, 0.45, &mid);
        assert!(!neutral.contains("Lexical variety is high.") && !neutral.contains("repeated"));
        let low = build_feedback(70, AcademicLevel::Advanced, 0.44, &mid);
        assert!(low.contains("Many words are repeated throughout the essay."));

        let varied = build_feedback(70, AcademicLevel::Advanced, 0.5, &usage_with_variety(0.7));
        assert!(varied.contains("Transitions are varied and connect ideas well."));
        let middling = build_feedback(70, AcademicLevel::Advanced, 0.5, &usage_with_variety(0.3));
        assert!(!middling.contains("Transitions are"));
        let sparse = build_feedback(70, AcademicLevel::Advanced, 0.5, &usage_with_variety(0.29));
        assert!(sparse.contains("Transitions are sparse or repetitive."));

        assert!(build_feedback(40, AcademicLevel::Basic, 0.5, &mid).contains("at a basic academic level."));
        assert!(build_feedback(40, AcademicLevel::Expert, 0.5, &mid).contains("at an expert academic level."));
    }

    #[test]
    fn test_strength_bands() {
        let soph = plain_sophistication();
        let strengths = build_strengths(0.6, AcademicLevel::Basic, &soph, &usage_with_variety(0.7), &[]);
        assert_eq!(
            strengths,
            vec![
                "Rich lexical variety".to_string(),
                "Wide range of transitional phrases".to_string(),
                "No common misspellings detected".to_string(),
            ]
        );

        let strengths = build_strengths(0.59, AcademicLevel::Advanced, &soph, &usage_with_variety(0.5), &[]);
        assert!(!strengths.contains(&"Rich lexical variety".to_string()));
        assert!(strengths.contains(&"Confident use of academic vocabulary".to_string()));
        assert!(strengths.contains(&"Good use of transitional phrases".to_string()));

        let strengths = build_strengths(0.5, AcademicLevel::Basic, &soph, &usage_with_variety(0.49), &[]);
        assert!(!strengths.iter().any(|s| s.contains("transitional phrases")));
    }

    #[test]
    fn test_improvement_area_bands() {
        let typos = vec![Typo {
            word: "teh".to_string(),
            suggestions: vec!["the".to_string()],
            context: String::new(),
        }];

        let areas = build_improvement_areas(0.44, AcademicLevel::Expert, &usage_with_variety(0.5), &[], &[]);
        assert_eq!(areas, vec!["Reduce word repetition; lexical variety is low".to_string()]);

        let areas = build_improvement_areas(0.45, AcademicLevel::Expert, &usage_with_variety(0.5), &[], &[]);
        assert_eq!(areas, vec!["Increase lexical variety".to_string()]);

        let areas = build_improvement_areas(0.5, AcademicLevel::Expert, &usage_with_variety(0.3), &[], &[]);
        assert!(areas.is_empty());

        let areas = build_improvement_areas(0.5, AcademicLevel::Basic, &usage_with_variety(0.29), &typos, &[]);
        assert_eq!(
            areas,
            vec![
                "Incorporate more precise, academic vocabulary".to_string(),
                "Use a broader range of transitions to connect ideas".to_string(),
                "Correct 1 spelling error(s)".to_string(),
            ]
        );
    }

    #[test]
    fn test_transition_suggestions() {
        let usage = TransitionUsage {
            overused: vec![("however", 4)],
            missing_categories: vec!["addition", "emphasis"],
            ..usage_with_variety(0.4)
        };
        let suggestions = build_suggestions("", &[], AcademicLevel::Advanced, &usage, Lexicon::standard());
        assert_eq!(
            suggestions,
            vec![
                "Vary the transition \"however\" (used 4 times); try nevertheless, on the other hand, in contrast instead."
                    .to_string(),
                "Add transitions for addition, emphasis relationships (for example: furthermore, indeed)."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_transition_suggestions_from_text() {
        let result = analyze("However, it rained. However, we went out. However, we got wet. For example, my shoes.");
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.starts_with("Vary the transition \"however\" (used 3 times)")));
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.starts_with("Add transitions for addition, cause, emphasis relationships")));
    }

    #[test]
    fn test_long_unpunctuated_input_stays_fast() {
        let text = "analysis word teh ".repeat(40_000);
        let start = std::time::Instant::now();
        let result = analyze(&text);
        assert_eq!(result.typos.len(), 40_000);
        assert_eq!(result.typos[0].context, "analysis word teh analysis word teh a");
        // Quadratic offset tracking needs minutes at this size
        assert!(start.elapsed() < std::time::Duration::from_secs(20));
    }
}
