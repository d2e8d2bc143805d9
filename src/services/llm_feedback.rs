// LLM Feedback
// Prompt construction and lenient parsing of provider replies
//
// Replies are decoded section by section: a malformed section is dropped and
// later filled by the local analyzers instead of failing the whole reply.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{
    percent_from_value, AiDetectionResult, PlagiarismResult, SectionFeedback, SentimentFeedback,
    VocabularyResult,
};

/// Essays longer than this are cut before being sent to a provider
const MAX_PROMPT_CHARS: usize = 24_000;

pub const SYSTEM_PROMPT: &str = r#"You are an experienced writing instructor reviewing a student essay.
Return a single JSON object and nothing else, with these fields:
- aiDetection: {isAiGenerated: bool, confidence: 0-100, markers: [string], feedback: string, score: 0-100 (likelihood the text is human-written)}
- vocabulary: {score: 0-100, feedback: string, advanced: [string], suggestions: [string], uniqueness: 0-100, academicLevel: "basic"|"intermediate"|"advanced"|"expert", improvementAreas: [string], strengths: [string], typos: [{word, suggestions: [string], context}]}
- plagiarism: {originalityScore: 0-100, matches: [{text, matchPercentage: 0-100, source, url, recommendation}]}
- structure, style, thesis, citations: {score: 0-100, feedback: string, suggestions: [string]}
- sentiment: {label: "positive"|"neutral"|"negative", score: 0-100, feedback: string}
- overallScore: 0-100
All scores are integers. Do not wrap the JSON in Markdown."#;

pub fn build_user_prompt(text: &str) -> String {
    let essay: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    format!("Analyze the following essay.\n\n<essay>\n{}\n</essay>", essay)
}

/// Outcome of decoding a provider reply; failures carry a reason instead of an error type
#[derive(Debug, Clone, PartialEq)]
pub enum LlmOutcome<T> {
    Parsed(T),
    Failed { reason: String },
}

impl<T> LlmOutcome<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Failed { .. } => None,
        }
    }
}

/// Provider feedback; every section is optional and missing ones are filled locally
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlmEssayFeedback {
    pub ai_detection: Option<AiDetectionResult>,
    pub vocabulary: Option<VocabularyResult>,
    pub plagiarism: Option<PlagiarismResult>,
    pub structure: Option<SectionFeedback>,
    pub style: Option<SectionFeedback>,
    pub thesis: Option<SectionFeedback>,
    pub citations: Option<SectionFeedback>,
    pub sentiment: Option<SentimentFeedback>,
    pub overall_score: Option<u8>,
    /// Sections present in the reply that could not be decoded
    pub dropped_sections: Vec<String>,
}

impl LlmEssayFeedback {
    fn is_empty(&self) -> bool {
        self.ai_detection.is_none()
            && self.vocabulary.is_none()
            && self.plagiarism.is_none()
            && self.structure.is_none()
            && self.style.is_none()
            && self.thesis.is_none()
            && self.citations.is_none()
            && self.sentiment.is_none()
            && self.overall_score.is_none()
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Outermost `{...}` span of the reply
pub fn extract_json(content: &str) -> Result<&str, String> {
    if content.starts_with('{') && content.ends_with('}') {
        Ok(content)
    } else if let Some(start) = content.find('{') {
        match content.rfind('}') {
            Some(end) if end > start => Ok(&content[start..=end]),
            _ => Err("Invalid JSON response".to_string()),
        }
    } else {
        Err("No JSON in response".to_string())
    }
}

pub fn parse_llm_feedback(content: &str) -> LlmOutcome<LlmEssayFeedback> {
    let body = strip_code_fences(content);
    let json = match extract_json(body) {
        Ok(j) => j,
        Err(reason) => return LlmOutcome::failed(reason),
    };

    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => return LlmOutcome::failed(format!("Malformed JSON: {}", e)),
    };
    let Value::Object(map) = value else {
        return LlmOutcome::failed("Reply is not a JSON object");
    };

    let mut feedback = LlmEssayFeedback::default();
    let mut dropped = Vec::new();

    feedback.ai_detection = section(&map, &["aiDetection", "ai_detection"], &mut dropped);
    feedback.vocabulary = section(&map, &["vocabulary"], &mut dropped);
    feedback.plagiarism = section(&map, &["plagiarism"], &mut dropped);
    feedback.structure = section(&map, &["structure"], &mut dropped);
    feedback.style = section(&map, &["style"], &mut dropped);
    feedback.thesis = section(&map, &["thesis"], &mut dropped);
    feedback.citations = section(&map, &["citations"], &mut dropped);
    feedback.sentiment = section(&map, &["sentiment"], &mut dropped);
    feedback.overall_score = ["overallScore", "overall_score"]
        .iter()
        .find_map(|k| map.get(*k))
        .filter(|v| !v.is_null())
        .map(percent_from_value);
    feedback.dropped_sections = dropped;

    if feedback.is_empty() {
        return LlmOutcome::failed("Reply contained no recognizable sections");
    }
    LlmOutcome::Parsed(feedback)
}

fn section<T: DeserializeOwned>(
    map: &Map<String, Value>,
    keys: &[&str],
    dropped: &mut Vec<String>,
) -> Option<T> {
    let (key, value) = keys
        .iter()
        .find_map(|k| map.get(*k).map(|v| (*k, v)))?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("[LLM_FEEDBACK] dropping section {}: {}", key, e);
            dropped.push(key.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AcademicLevel;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_extract_json_with_prose() {
        assert_eq!(extract_json("Sure! {\"a\": 1} Hope this helps.").unwrap(), "{\"a\": 1}");
        assert!(extract_json("no braces").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = r#"```json
{
  "aiDetection": {"isLikelyAI": true, "confidence": "85", "markers": ["uniform tone"]},
  "vocabulary": {"score": 72.6, "academicLevel": "Advanced"},
  "overallScore": "81%"
}
```"#;
        let feedback = parse_llm_feedback(reply).ok().unwrap();
        let ai = feedback.ai_detection.unwrap();
        assert!(ai.is_ai_generated);
        assert_eq!(ai.confidence, 85);
        let vocab = feedback.vocabulary.unwrap();
        assert_eq!(vocab.score, 73);
        assert_eq!(vocab.academic_level, AcademicLevel::Advanced);
        assert_eq!(feedback.overall_score, Some(81));
        assert!(feedback.plagiarism.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let feedback = parse_llm_feedback(r#"{"plagiarism": {}, "sentiment": {}}"#)
            .ok()
            .unwrap();
        assert_eq!(feedback.plagiarism.unwrap().originality_score, 100);
        let sentiment = feedback.sentiment.unwrap();
        assert_eq!(sentiment.label, "neutral");
        assert_eq!(sentiment.score, 50);
    }

    #[test]
    fn test_bad_section_is_dropped() {
        let feedback = parse_llm_feedback(r#"{"vocabulary": "great", "thesis": {"score": 60}}"#)
            .ok()
            .unwrap();
        assert!(feedback.vocabulary.is_none());
        assert_eq!(feedback.dropped_sections, vec!["vocabulary".to_string()]);
        assert_eq!(feedback.thesis.unwrap().score, 60);
    }

    #[test]
    fn test_out_of_range_ai_scores_are_kept_and_clamped() {
        let feedback = parse_llm_feedback(r#"{"aiDetection": {"isAiGenerated": true, "score": 250}}"#)
            .ok()
            .unwrap();
        assert!(feedback.dropped_sections.is_empty());
        let ai = feedback.ai_detection.unwrap();
        assert!(ai.is_ai_generated);
        assert_eq!(ai.score, 100.0);

        let feedback = parse_llm_feedback(r#"{"aiDetection": {"score": "72"}}"#).ok().unwrap();
        assert!(feedback.dropped_sections.is_empty());
        assert_eq!(feedback.ai_detection.unwrap().score, 72.0);
    }

    #[test]
    fn test_garbage_fails() {
        assert!(matches!(
            parse_llm_feedback("I cannot help with that."),
            LlmOutcome::Failed { .. }
        ));
        assert!(!parse_llm_feedback("{\"a\": }").is_parsed());
        assert!(!parse_llm_feedback("{\"unrelated\": 1}").is_parsed());
    }

    #[test]
    fn test_user_prompt_is_bounded() {
        let long = "a".repeat(MAX_PROMPT_CHARS + 500);
        let prompt = build_user_prompt(&long);
        assert!(prompt.chars().count() < MAX_PROMPT_CHARS + 100);
        assert!(prompt.contains("<essay>"));
    }
}
