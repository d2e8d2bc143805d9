// Scoring Module
// Local heuristic analyzers used when no LLM provider is available:
// - ai_detection: stylometric estimate of machine-written text
// - vocabulary: sophistication, typos, transitions, substitution suggestions
// - plagiarism: keyword-triggered common-phrase matcher (a stand-in, not a detector)
// - readability: Flesch reading ease / grade level
// - lexicon: the read-only lookup tables all of the above share
//
// Every analyzer is a pure function of its input text.

pub mod ai_detection;
pub mod lexicon;
pub mod plagiarism;
pub mod readability;
pub mod vocabulary;

use crate::models::{AiDetectionResult, PlagiarismResult, ReadabilityResult, VocabularyResult};

pub use ai_detection::{
    agreement_confidence, analyze_patterns, analyze_style, analyze_vocabulary_distribution,
    DistributionMetrics, PatternMetrics, StyleMetrics,
};
pub use lexicon::{Lexicon, PhraseSource, TransitionCategory};

pub fn run_ai_detection(text: &str) -> AiDetectionResult {
    ai_detection::detect(text)
}

pub fn run_vocabulary_analysis(text: &str) -> VocabularyResult {
    vocabulary::analyze(text)
}

pub fn run_plagiarism_fallback(text: &str) -> PlagiarismResult {
    plagiarism::check(text)
}

pub fn run_readability_analysis(text: &str) -> ReadabilityResult {
    readability::analyze(text)
}
