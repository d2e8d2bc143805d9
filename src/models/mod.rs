// essayLens Data Models
// Result objects produced by the scoring engine and by LLM providers.
//
// Every field tolerates being absent in provider JSON; the defaults below are the
// values a report shows when a provider leaves something out.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============ AI Detection ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAnalysis {
    /// 0-100, higher means more human-like
    #[serde(default = "default_neutral_score", deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default)]
    pub is_ai_generated: bool,
    #[serde(default)]
    pub markers: Vec<String>,
}

impl Default for SubAnalysis {
    fn default() -> Self {
        Self {
            score: default_neutral_score(),
            is_ai_generated: false,
            markers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiDetectionBreakdown {
    #[serde(default)]
    pub style: SubAnalysis,
    #[serde(default)]
    pub pattern: SubAnalysis,
    #[serde(default)]
    pub vocabulary: SubAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDetectionResult {
    #[serde(default, alias = "isLikelyAI", alias = "isLikelyAi")]
    pub is_ai_generated: bool,
    /// One of 50/70/85/95 when produced locally
    #[serde(default = "default_confidence", deserialize_with = "lenient_percent")]
    pub confidence: u8,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub feedback: String,
    /// Combined human-likelihood score, 0-100
    #[serde(default = "default_neutral_score", deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default)]
    pub breakdown: AiDetectionBreakdown,
}

impl Default for AiDetectionResult {
    fn default() -> Self {
        Self {
            is_ai_generated: false,
            confidence: default_confidence(),
            markers: Vec::new(),
            feedback: String::new(),
            score: default_neutral_score(),
            breakdown: AiDetectionBreakdown::default(),
        }
    }
}

// ============ Vocabulary ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AcademicLevel {
    #[default]
    #[serde(alias = "Basic")]
    Basic,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
    #[serde(alias = "Expert")]
    Expert,
}

impl AcademicLevel {
    /// Bands on the sophistication score: <45, <60, <75, rest
    pub fn from_sophistication(score: f64) -> Self {
        if score < 45.0 {
            Self::Basic
        } else if score < 60.0 {
            Self::Intermediate
        } else if score < 75.0 {
            Self::Advanced
        } else {
            Self::Expert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Advanced | Self::Expert)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Typo {
    pub word: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyResult {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub advanced: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Lexical density x 100
    #[serde(default, deserialize_with = "lenient_percent")]
    pub uniqueness: u8,
    #[serde(default)]
    pub academic_level: AcademicLevel,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub typos: Vec<Typo>,
}

// ============ Plagiarism ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismMatch {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub match_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismResult {
    #[serde(default = "default_originality", deserialize_with = "lenient_percent")]
    pub originality_score: u8,
    #[serde(default)]
    pub matches: Vec<PlagiarismMatch>,
}

impl Default for PlagiarismResult {
    fn default() -> Self {
        Self {
            originality_score: default_originality(),
            matches: Vec::new(),
        }
    }
}

// ============ Readability ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityResult {
    /// Flesch reading ease, clamped to 0-100
    #[serde(default)]
    pub score: f64,
    /// Flesch-Kincaid grade level
    #[serde(default)]
    pub grade_level: f64,
    #[serde(default)]
    pub avg_sentence_length: f64,
    #[serde(default)]
    pub avg_syllables_per_word: f64,
    #[serde(default)]
    pub feedback: String,
}

// ============ Provider-only Sections ============

/// Structure / style / thesis / citation feedback; only LLM providers fill these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentFeedback {
    #[serde(default = "default_sentiment_label")]
    pub label: String,
    /// 0 = very negative, 50 = neutral, 100 = very positive
    #[serde(default = "default_neutral_percent", deserialize_with = "lenient_percent")]
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
}

impl Default for SentimentFeedback {
    fn default() -> Self {
        Self {
            label: default_sentiment_label(),
            score: default_neutral_percent(),
            feedback: String::new(),
        }
    }
}

// ============ Report ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    OpenAi,
    Gemini,
    Local,
}

impl ReportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayReport {
    pub id: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    pub source: ReportSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub word_count: usize,
    pub overall_score: u8,
    pub ai_detection: AiDetectionResult,
    pub vocabulary: VocabularyResult,
    pub plagiarism: PlagiarismResult,
    pub readability: ReadabilityResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<SectionFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SectionFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thesis: Option<SectionFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<SectionFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentFeedback>,
}

// ============ Lenient Number Parsing ============

/// Accepts integers, floats and numeric strings ("87", "87.5", "87%"), rounded and clamped to 0-100.
/// Anything else (null, objects, garbage strings) becomes 0.
pub fn percent_from_value(value: &Value) -> u8 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_nan() {
        return 0;
    }
    n.round().clamp(0.0, 100.0) as u8
}

fn lenient_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(percent_from_value(&value))
}

/// Like `percent_from_value` but keeps fractions; unusable values fall back to the neutral 50.
pub fn score_from_value(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => n.clamp(0.0, 100.0),
        _ => default_neutral_score(),
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(score_from_value(&value))
}

// ============ Default Value Functions ============

fn default_neutral_score() -> f64 { 50.0 }
fn default_confidence() -> u8 { 50 }
fn default_originality() -> u8 { 100 }
fn default_neutral_percent() -> u8 { 50 }
fn default_sentiment_label() -> String { "neutral".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_value() {
        assert_eq!(percent_from_value(&serde_json::json!(87)), 87);
        assert_eq!(percent_from_value(&serde_json::json!(87.6)), 88);
        assert_eq!(percent_from_value(&serde_json::json!("72%")), 72);
        assert_eq!(percent_from_value(&serde_json::json!(240)), 100);
        assert_eq!(percent_from_value(&serde_json::json!(-3)), 0);
        assert_eq!(percent_from_value(&serde_json::json!(null)), 0);
        assert_eq!(percent_from_value(&serde_json::json!("high")), 0);
    }

    #[test]
    fn test_score_from_value() {
        assert_eq!(score_from_value(&serde_json::json!(72.5)), 72.5);
        assert_eq!(score_from_value(&serde_json::json!("72")), 72.0);
        assert_eq!(score_from_value(&serde_json::json!(" 64.5% ")), 64.5);
        assert_eq!(score_from_value(&serde_json::json!(250)), 100.0);
        assert_eq!(score_from_value(&serde_json::json!(-20)), 0.0);
        assert_eq!(score_from_value(&serde_json::json!("NaN")), 50.0);
        assert_eq!(score_from_value(&serde_json::json!("likely")), 50.0);
        assert_eq!(score_from_value(&serde_json::json!(null)), 50.0);
    }

    #[test]
    fn test_ai_scores_are_clamped_on_decode() {
        let ai: AiDetectionResult = serde_json::from_str(
            r#"{"isAiGenerated": true, "score": 250, "breakdown": {"style": {"score": "-5"}, "pattern": {"score": "38.5"}}}"#,
        )
        .unwrap();
        assert_eq!(ai.score, 100.0);
        assert_eq!(ai.breakdown.style.score, 0.0);
        assert_eq!(ai.breakdown.pattern.score, 38.5);
        assert_eq!(ai.breakdown.vocabulary.score, 50.0);

        let ai: AiDetectionResult = serde_json::from_str(r#"{"score": "72"}"#).unwrap();
        assert_eq!(ai.score, 72.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let ai: AiDetectionResult = serde_json::from_str(r#"{"isLikelyAI": true}"#).unwrap();
        assert!(ai.is_ai_generated);
        assert_eq!(ai.confidence, 50);
        assert_eq!(ai.score, 50.0);

        let plag: PlagiarismResult = serde_json::from_str("{}").unwrap();
        assert_eq!(plag.originality_score, 100);
        assert!(plag.matches.is_empty());

        let vocab: VocabularyResult =
            serde_json::from_str(r#"{"score": "81", "academicLevel": "Advanced"}"#).unwrap();
        assert_eq!(vocab.score, 81);
        assert_eq!(vocab.academic_level, AcademicLevel::Advanced);
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let result = VocabularyResult {
            academic_level: AcademicLevel::Expert,
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["academicLevel"], "expert");
        assert!(json.get("improvementAreas").is_some());

        let source = serde_json::to_value(ReportSource::OpenAi).unwrap();
        assert_eq!(source, "openai");
    }

    #[test]
    fn test_academic_level_bands() {
        assert_eq!(AcademicLevel::from_sophistication(44.9), AcademicLevel::Basic);
        assert_eq!(AcademicLevel::from_sophistication(45.0), AcademicLevel::Intermediate);
        assert_eq!(AcademicLevel::from_sophistication(60.0), AcademicLevel::Advanced);
        assert_eq!(AcademicLevel::from_sophistication(75.0), AcademicLevel::Expert);
    }
}
