// Essay Analyzer
// Orchestrates one analysis run:
// - local analyzers fanned out on the blocking pool
// - optional provider call (bounded by a timeout) in parallel
// - provider sections merged over local results; anything missing stays local

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::models::{
    AiDetectionResult, EssayReport, PlagiarismResult, ReadabilityResult, ReportSource,
    VocabularyResult,
};
use crate::services::config_store::{AnalysisConfig, ProviderCredentials};
use crate::services::llm_feedback::{
    build_user_prompt, parse_llm_feedback, LlmEssayFeedback, LlmOutcome, SYSTEM_PROMPT,
};
use crate::services::providers::{ProviderClient, ProviderKind};
use crate::services::scoring::{
    run_ai_detection, run_plagiarism_fallback, run_readability_analysis, run_vocabulary_analysis,
};
use crate::services::text_processor::tokenize_words;

/// Results of the four local analyzers for one text
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAnalysis {
    pub ai_detection: AiDetectionResult,
    pub vocabulary: VocabularyResult,
    pub plagiarism: PlagiarismResult,
    pub readability: ReadabilityResult,
}

impl LocalAnalysis {
    /// Sequential run on the current thread
    pub fn compute(text: &str) -> Self {
        Self {
            ai_detection: run_ai_detection(text),
            vocabulary: run_vocabulary_analysis(text),
            plagiarism: run_plagiarism_fallback(text),
            readability: run_readability_analysis(text),
        }
    }

    /// Same results as `compute`, each analyzer on its own blocking task
    pub async fn compute_parallel(text: Arc<str>) -> Self {
        let (ai_detection, vocabulary, plagiarism, readability) = tokio::join!(
            run_blocking(Arc::clone(&text), run_ai_detection),
            run_blocking(Arc::clone(&text), run_vocabulary_analysis),
            run_blocking(Arc::clone(&text), run_plagiarism_fallback),
            run_blocking(text, run_readability_analysis),
        );
        Self {
            ai_detection,
            vocabulary,
            plagiarism,
            readability,
        }
    }
}

async fn run_blocking<T: Send + 'static>(text: Arc<str>, analyzer: fn(&str) -> T) -> T {
    let task_text = Arc::clone(&text);
    match tokio::task::spawn_blocking(move || analyzer(&task_text)).await {
        Ok(result) => result,
        Err(e) => {
            warn!("[ESSAY_ANALYZER] blocking analyzer task failed, rerunning inline: {}", e);
            analyzer(&text)
        }
    }
}

pub struct EssayAnalyzer {
    client: ProviderClient,
    credentials: ProviderCredentials,
    config: AnalysisConfig,
    openai_model: Option<String>,
    gemini_model: Option<String>,
}

impl EssayAnalyzer {
    pub fn new(
        client: ProviderClient,
        credentials: ProviderCredentials,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            config,
            openai_model: None,
            gemini_model: None,
        }
    }

    /// Analyzer that never contacts a provider
    pub fn local_only() -> Self {
        Self::new(
            ProviderClient::new(),
            ProviderCredentials::none(),
            AnalysisConfig {
                use_llm: false,
                ..AnalysisConfig::default()
            },
        )
    }

    pub fn with_model(mut self, kind: ProviderKind, model: impl Into<String>) -> Self {
        let model = Some(model.into()).filter(|m: &String| !m.trim().is_empty());
        match kind {
            ProviderKind::OpenAi => self.openai_model = model,
            ProviderKind::Gemini => self.gemini_model = model,
        }
        self
    }

    /// Provider to use: the preferred one if it has a key, otherwise OpenAI, then Gemini
    pub fn select_provider(&self) -> Option<(ProviderKind, &str)> {
        let key_for = |kind: ProviderKind| match kind {
            ProviderKind::OpenAi => self.credentials.openai.as_deref(),
            ProviderKind::Gemini => self.credentials.gemini.as_deref(),
        };

        let preferred = self
            .credentials
            .preferred
            .as_deref()
            .and_then(ProviderKind::parse);

        preferred
            .into_iter()
            .chain([ProviderKind::OpenAi, ProviderKind::Gemini])
            .find_map(|kind| key_for(kind).map(|key| (kind, key)))
    }

    /// Local-only report, computed synchronously
    pub fn analyze_local(text: &str) -> EssayReport {
        build_report(text, LocalAnalysis::compute(text), None)
    }

    pub async fn analyze(&self, text: &str) -> EssayReport {
        let start = Instant::now();
        let shared: Arc<str> = Arc::from(text);

        let (local, provider) = tokio::join!(
            LocalAnalysis::compute_parallel(Arc::clone(&shared)),
            self.consult_provider(text)
        );

        let report = match provider {
            Ok((kind, feedback)) => build_report(text, local, Some((kind, feedback))),
            Err(reason) => {
                info!("[ESSAY_ANALYZER] using local analysis: {}", reason);
                let mut report = build_report(text, local, None);
                report.fallback_reason = Some(reason);
                report
            }
        };

        info!(
            "[ESSAY_ANALYZER] report id={} source={} words={} overall={} elapsed_ms={}",
            report.id,
            report.source.as_str(),
            report.word_count,
            report.overall_score,
            start.elapsed().as_millis()
        );
        report
    }

    /// Provider feedback, or the reason the local analysis stands alone
    async fn consult_provider(&self, text: &str) -> Result<(ProviderKind, LlmEssayFeedback), String> {
        if !self.config.use_llm {
            return Err("LLM analysis disabled".to_string());
        }
        if text.trim().is_empty() {
            return Err("Empty input".to_string());
        }
        let Some((kind, api_key)) = self.select_provider() else {
            return Err("No provider API key configured".to_string());
        };

        let model = match kind {
            ProviderKind::OpenAi => self.openai_model.as_deref(),
            ProviderKind::Gemini => self.gemini_model.as_deref(),
        }
        .unwrap_or(kind.default_model());

        let user = build_user_prompt(text);
        let timeout_secs = self.config.llm_timeout_secs.max(1);
        let call = self.client.call(
            kind,
            model,
            api_key,
            SYSTEM_PROMPT,
            &user,
            self.config.max_tokens,
        );

        let result = match tokio::time::timeout(Duration::from_secs(timeout_secs), call).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!("[ESSAY_ANALYZER] {} call failed: {}", kind.as_str(), e);
                return Err(format!("{} request failed: {}", kind.as_str(), e));
            }
            Err(_) => {
                warn!("[ESSAY_ANALYZER] {} call timeout ({}s)", kind.as_str(), timeout_secs);
                return Err(format!("{} request timed out after {}s", kind.as_str(), timeout_secs));
            }
        };

        match parse_llm_feedback(&result.content) {
            LlmOutcome::Parsed(feedback) => {
                if !feedback.dropped_sections.is_empty() {
                    warn!(
                        "[ESSAY_ANALYZER] {} reply had undecodable sections: {:?}",
                        kind.as_str(),
                        feedback.dropped_sections
                    );
                }
                Ok((kind, feedback))
            }
            LlmOutcome::Failed { reason } => {
                warn!("[ESSAY_ANALYZER] {} reply unusable: {}", kind.as_str(), reason);
                Err(format!("{} reply unusable: {}", kind.as_str(), reason))
            }
        }
    }
}

fn build_report(
    text: &str,
    local: LocalAnalysis,
    provider: Option<(ProviderKind, LlmEssayFeedback)>,
) -> EssayReport {
    let word_count = tokenize_words(text).len();

    let mut report = EssayReport {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        source: ReportSource::Local,
        fallback_reason: None,
        word_count,
        overall_score: 0,
        ai_detection: local.ai_detection,
        vocabulary: local.vocabulary,
        plagiarism: local.plagiarism,
        readability: local.readability,
        structure: None,
        style: None,
        thesis: None,
        citations: None,
        sentiment: None,
    };

    let mut provider_overall = None;
    if let Some((kind, feedback)) = provider {
        report.source = kind.report_source();
        if let Some(v) = feedback.ai_detection {
            report.ai_detection = v;
        }
        if let Some(v) = feedback.vocabulary {
            report.vocabulary = v;
        }
        if let Some(v) = feedback.plagiarism {
            report.plagiarism = v;
        }
        report.structure = feedback.structure;
        report.style = feedback.style;
        report.thesis = feedback.thesis;
        report.citations = feedback.citations;
        report.sentiment = feedback.sentiment;
        provider_overall = feedback.overall_score;
    }

    let overall = provider_overall.unwrap_or_else(|| overall_score(&report));
    report.overall_score = overall;
    report
}

/// Rounded mean of the 0-100 section scores in the report; 0 for an empty essay
pub fn overall_score(report: &EssayReport) -> u8 {
    if report.word_count == 0 {
        return 0;
    }

    let mut scores = vec![
        report.ai_detection.score,
        report.vocabulary.score as f64,
        report.plagiarism.originality_score as f64,
    ];
    scores.extend(
        [&report.structure, &report.style, &report.thesis, &report.citations]
            .into_iter()
            .flatten()
            .map(|s| s.score as f64),
    );

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}
