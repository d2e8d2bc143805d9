// AI Detection
// Surface-statistics estimate of whether an essay was machine written.
//
// Three independent sub-analyses each produce a 0-100 "human likelihood" score:
// - style: sentence/paragraph rhythm, formal connectives, personal voice
// - pattern: lexical density, punctuation regularity, figurative and colloquial language
// - vocabulary distribution: repeated n-grams, typos, per-paragraph sophistication drift
//
// Weights and thresholds are uncalibrated constants carried over as-is. Changing
// any of them changes verdicts, so they stay fixed until there is labelled data.

use crate::models::{AiDetectionBreakdown, AiDetectionResult, SubAnalysis};
use crate::services::text_processor::{
    count_phrase, count_syllables, ngram_counts, split_paragraphs, split_sentences,
    split_sentences_with_terminal, std_dev, tokenize_words,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::lexicon::Lexicon;

const STYLE_WEIGHT: f64 = 0.3;
const PATTERN_WEIGHT: f64 = 0.4;
const VOCABULARY_WEIGHT: f64 = 0.3;
/// Combined score below this is reported as AI generated
const AI_VERDICT_THRESHOLD: f64 = 65.0;
/// Each sub-analysis votes AI below this
const SUB_VERDICT_THRESHOLD: f64 = 60.0;
const MAX_MARKERS: usize = 5;
const NEUTRAL_SCORE: f64 = 50.0;

fn personal_marker_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(?i)\bI (?:think|believe|feel|guess|suppose|remember)\b")
                .expect("personal opinion regex"),
            Regex::new(r"(?i)\bin my (?:opinion|view|experience|mind)\b")
                .expect("personal view regex"),
            Regex::new(r"(?i)\bfrom my perspective\b").expect("perspective regex"),
        ]
    })
}

fn creativity_res() -> &'static [Regex; 4] {
    static RES: OnceLock<[Regex; 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            // similes
            Regex::new(r"(?i)\b(?:like an?|as \w+ as)\b").expect("simile regex"),
            Regex::new(r"(?i)\b(?:metaphor(?:ically)?|figuratively|symbolically|imagery)\b")
                .expect("figurative regex"),
            Regex::new(r"(?i)\b(?:symboli[sz]es|represents|embodies|evokes)\b")
                .expect("representational regex"),
            Regex::new(r"(?i)\b(?:imagine[ds]?|envision(?:ed|s)?|daydream(?:ed|s)?)\b")
                .expect("imagination regex"),
        ]
    })
}

fn colloquial_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(?i)\b(?:gonna|wanna|gotta|kinda|sorta|y'all|ain't)\b")
                .expect("slang regex"),
            Regex::new(
                r"(?i)\b(?:piece of cake|break the ice|hit the nail on the head|once in a blue moon|under the weather|cost an arm and a leg)\b",
            )
            .expect("idiom regex"),
            Regex::new(r"(?i)\b(?:pretty much|no big deal|stuff like that|you know|i mean)\b")
                .expect("filler regex"),
        ]
    })
}

// ============================================================================
// Sub-analysis metrics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StyleMetrics {
    pub sentence_length_std_dev: f64,
    pub paragraph_length_std_dev: f64,
    /// Formal transitions per 1000 characters
    pub transition_density: f64,
    pub personal_markers: usize,
    pub score: f64,
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternMetrics {
    pub lexical_density: f64,
    pub grammar_perfection: f64,
    pub creativity: f64,
    pub colloquialisms: f64,
    pub score: f64,
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionMetrics {
    pub repetition_ratio: f64,
    pub typo_count: usize,
    pub sophistication_consistency: f64,
    pub score: f64,
    pub markers: Vec<String>,
}

pub fn analyze_style(text: &str) -> StyleMetrics {
    analyze_style_with(text, Lexicon::standard())
}

pub fn analyze_style_with(text: &str, lexicon: &Lexicon) -> StyleMetrics {
    let sentence_lengths: Vec<f64> = split_sentences(text)
        .iter()
        .map(|s| s.split_whitespace().count() as f64)
        .collect();
    let paragraph_lengths: Vec<f64> = split_paragraphs(text)
        .iter()
        .map(|p| p.chars().count() as f64)
        .collect();

    let sentence_sd = std_dev(&sentence_lengths);
    let paragraph_sd = std_dev(&paragraph_lengths);

    let lower = text.to_lowercase();
    let transition_count: usize = lexicon
        .formal_transitions
        .iter()
        .map(|t| count_phrase(&lower, t))
        .sum();
    let char_count = text.chars().count();
    let transition_density = if char_count == 0 {
        0.0
    } else {
        transition_count as f64 / char_count as f64 * 1000.0
    };

    let personal_markers: usize = personal_marker_res()
        .iter()
        .map(|re| re.find_iter(text).count())
        .sum();

    let score = ((sentence_sd * 5.0).min(40.0)
        + (paragraph_sd / 10.0).min(20.0)
        + (20.0 - transition_density * 10.0).max(0.0)
        + (personal_markers as f64 * 5.0).min(20.0))
    .clamp(0.0, 100.0);

    let mut markers = Vec::new();
    if sentence_lengths.len() > 1 && sentence_sd < 3.0 {
        markers.push("Low sentence length variation".to_string());
    }
    if paragraph_lengths.len() > 1 && paragraph_sd < 50.0 {
        markers.push("Uniform paragraph lengths".to_string());
    }
    if transition_density > 1.0 {
        markers.push("Heavy use of formal transitions".to_string());
    }
    if personal_markers == 0 {
        markers.push("No personal voice or opinion markers".to_string());
    }

    StyleMetrics {
        sentence_length_std_dev: sentence_sd,
        paragraph_length_std_dev: paragraph_sd,
        transition_density,
        personal_markers,
        score,
        markers,
    }
}

/// Mean of the dominant terminal-punctuation share and the comma-usage skew.
/// Fewer than three sentences carries no signal and returns 0.5.
fn grammar_perfection(text: &str) -> f64 {
    let sentences = split_sentences_with_terminal(text);
    if sentences.len() < 3 {
        return 0.5;
    }
    let n = sentences.len() as f64;

    let mut periods = 0usize;
    let mut exclamations = 0usize;
    let mut questions = 0usize;
    let mut unterminated = 0usize;
    for s in &sentences {
        match s.terminal {
            Some('.') => periods += 1,
            Some('!') => exclamations += 1,
            Some('?') => questions += 1,
            _ => unterminated += 1,
        }
    }
    let dominant = periods.max(exclamations).max(questions).max(unterminated) as f64 / n;

    let comma_ratio = sentences.iter().filter(|s| s.text.contains(',')).count() as f64 / n;
    let comma_consistency = (comma_ratio - 0.5).abs() * 2.0;

    (dominant + comma_consistency) / 2.0
}

pub fn analyze_patterns(text: &str) -> PatternMetrics {
    let words = tokenize_words(text);
    let lexical_density = if words.is_empty() {
        0.0
    } else {
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        unique.len() as f64 / words.len() as f64
    };

    let perfection = grammar_perfection(text);

    let creativity = creativity_res()
        .iter()
        .map(|re| re.find_iter(text).count() as f64 * 5.0)
        .sum::<f64>()
        .min(20.0);
    let colloquialisms = colloquial_res()
        .iter()
        .map(|re| re.find_iter(text).count() as f64 * 10.0)
        .sum::<f64>()
        .min(10.0);

    let score = ((50.0 - lexical_density * 100.0).max(0.0)
        + (20.0 - perfection * 20.0).max(0.0)
        + creativity
        + colloquialisms)
        .clamp(0.0, 100.0);

    let mut markers = Vec::new();
    if lexical_density > 0.6 {
        markers.push("Unusually high lexical diversity".to_string());
    }
    if perfection > 0.8 {
        markers.push("Highly consistent punctuation".to_string());
    }
    if creativity == 0.0 {
        markers.push("Little figurative or creative language".to_string());
    }
    if colloquialisms == 0.0 {
        markers.push("No colloquial expressions".to_string());
    }

    PatternMetrics {
        lexical_density,
        grammar_perfection: perfection,
        creativity,
        colloquialisms,
        score,
        markers,
    }
}

fn count_typos(words: &[String], lexicon: &Lexicon) -> usize {
    words
        .iter()
        .filter(|w| {
            lexicon.corrections_for(w.as_str()).is_some()
                || (w.chars().count() > 4 && lexicon.has_unusual_letter_pair(w.as_str()))
        })
        .count()
}

/// `1 / (1 + sd)` of per-paragraph sophistication; 0.5 when there are fewer than two paragraphs
fn sophistication_consistency(text: &str, lexicon: &Lexicon) -> f64 {
    let paragraphs = split_paragraphs(text);
    if paragraphs.len() < 2 {
        return 0.5;
    }

    let per_paragraph: Vec<f64> = paragraphs
        .iter()
        .filter_map(|p| {
            let content: Vec<String> = tokenize_words(p)
                .into_iter()
                .filter(|w| lexicon.is_content_word(w))
                .collect();
            if content.is_empty() {
                return None;
            }
            let avg_len = content.iter().map(|w| w.chars().count() as f64).sum::<f64>()
                / content.len() as f64;
            let complex_ratio = content.iter().filter(|w| count_syllables(w.as_str()) >= 3).count() as f64
                / content.len() as f64;
            Some(avg_len + 2.0 * complex_ratio)
        })
        .collect();

    if per_paragraph.len() < 2 {
        return 0.5;
    }
    1.0 / (1.0 + std_dev(&per_paragraph))
}

pub fn analyze_vocabulary_distribution(text: &str) -> DistributionMetrics {
    analyze_vocabulary_distribution_with(text, Lexicon::standard())
}

pub fn analyze_vocabulary_distribution_with(text: &str, lexicon: &Lexicon) -> DistributionMetrics {
    let words = tokenize_words(text);

    let repeated = |n: usize| ngram_counts(&words, n).values().filter(|&&c| c > 1).count();
    let repetition_ratio = if words.is_empty() {
        0.0
    } else {
        (repeated(3) as f64 + repeated(4) as f64 * 2.0) / (words.len() as f64 / 20.0)
    };

    let typo_count = count_typos(&words, lexicon);
    let consistency = sophistication_consistency(text, lexicon);

    let score = ((40.0 - repetition_ratio * 10.0).max(0.0)
        + (typo_count as f64 * 5.0).min(30.0)
        + (30.0 - consistency * 30.0).max(0.0))
    .clamp(0.0, 100.0);

    let mut markers = Vec::new();
    if repetition_ratio > 1.0 {
        markers.push("Repetitive phrasing patterns".to_string());
    }
    if typo_count == 0 {
        markers.push("No typographical errors".to_string());
    }
    if consistency > 0.8 {
        markers.push("Uniform vocabulary sophistication".to_string());
    }

    DistributionMetrics {
        repetition_ratio,
        typo_count,
        sophistication_consistency: consistency,
        score,
        markers,
    }
}

// ============================================================================
// Combination
// ============================================================================

/// Confidence tier from how strongly the sub-analysis votes agree
pub fn agreement_confidence(votes: &[bool]) -> u8 {
    if votes.is_empty() {
        return 50;
    }
    let ai = votes.iter().filter(|v| **v).count();
    let agreeing = ai.max(votes.len() - ai) as f64 / votes.len() as f64;
    if agreeing >= 1.0 {
        95
    } else if agreeing >= 0.75 {
        85
    } else if agreeing > 0.5 {
        70
    } else {
        50
    }
}

fn sub_analysis(score: f64, markers: Vec<String>) -> SubAnalysis {
    SubAnalysis {
        score: round1(score),
        is_ai_generated: score < SUB_VERDICT_THRESHOLD,
        markers,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn join_markers(markers: &[String], take: usize) -> String {
    markers
        .iter()
        .take(take)
        .map(|m| m.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_feedback(is_ai: bool, score: f64, markers: &[String]) -> String {
    let detail = |take: usize| {
        if markers.is_empty() {
            String::new()
        } else {
            format!(" Signals observed: {}.", join_markers(markers, take))
        }
    };

    if is_ai {
        if score < 40.0 {
            format!(
                "This essay shows strong indications of AI generation.{} Consider rewriting key passages in your own voice.",
                detail(3)
            )
        } else {
            format!(
                "This essay shows several patterns associated with AI-generated text.{} Adding personal insight and varied sentence structure would make it read as more authentic.",
                detail(2)
            )
        }
    } else if score > 80.0 {
        "This essay reads as authentically human-written, with natural variation in style and vocabulary.".to_string()
    } else {
        format!(
            "This essay appears to be mostly human-written, though some passages show patterns common in AI text.{}",
            detail(2)
        )
    }
}

fn neutral_result() -> AiDetectionResult {
    let neutral = SubAnalysis {
        score: NEUTRAL_SCORE,
        is_ai_generated: false,
        markers: Vec::new(),
    };
    AiDetectionResult {
        is_ai_generated: false,
        confidence: 50,
        markers: Vec::new(),
        feedback: "Not enough text to assess whether the essay was AI generated.".to_string(),
        score: NEUTRAL_SCORE,
        breakdown: AiDetectionBreakdown {
            style: neutral.clone(),
            pattern: neutral.clone(),
            vocabulary: neutral,
        },
    }
}

pub fn detect(text: &str) -> AiDetectionResult {
    detect_with(text, Lexicon::standard())
}

pub fn detect_with(text: &str, lexicon: &Lexicon) -> AiDetectionResult {
    if tokenize_words(text).is_empty() {
        return neutral_result();
    }

    let style = analyze_style_with(text, lexicon);
    let pattern = analyze_patterns(text);
    let distribution = analyze_vocabulary_distribution_with(text, lexicon);

    let combined = (style.score * STYLE_WEIGHT
        + pattern.score * PATTERN_WEIGHT
        + distribution.score * VOCABULARY_WEIGHT)
        .clamp(0.0, 100.0);
    let is_ai_generated = combined < AI_VERDICT_THRESHOLD;

    let breakdown = AiDetectionBreakdown {
        style: sub_analysis(style.score, style.markers),
        pattern: sub_analysis(pattern.score, pattern.markers),
        vocabulary: sub_analysis(distribution.score, distribution.markers),
    };
    let confidence = agreement_confidence(&[
        breakdown.style.is_ai_generated,
        breakdown.pattern.is_ai_generated,
        breakdown.vocabulary.is_ai_generated,
    ]);

    let mut markers: Vec<String> = Vec::new();
    for m in breakdown
        .style
        .markers
        .iter()
        .chain(&breakdown.pattern.markers)
        .chain(&breakdown.vocabulary.markers)
    {
        if !markers.contains(m) {
            markers.push(m.clone());
        }
    }
    markers.truncate(MAX_MARKERS);

    let feedback = build_feedback(is_ai_generated, combined, &markers);

    AiDetectionResult {
        is_ai_generated,
        confidence,
        markers,
        feedback,
        score: round1(combined),
        breakdown,
    }
}
