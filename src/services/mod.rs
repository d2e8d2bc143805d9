// essayLens Core Services

pub mod config_store;
pub mod essay_analyzer;
pub mod llm_feedback;
pub mod providers;
pub mod scoring;
pub mod text_processor;

pub use config_store::*;
pub use essay_analyzer::{EssayAnalyzer, LocalAnalysis};
pub use llm_feedback::{parse_llm_feedback, LlmEssayFeedback, LlmOutcome};
pub use providers::*;
pub use text_processor::*;

// Re-export scoring entry points
pub use scoring::{
    run_ai_detection,
    run_plagiarism_fallback,
    run_readability_analysis,
    run_vocabulary_analysis,
    Lexicon,
};
