//! Evaluation client. Turns `(content, title)` into a `Report` via Gemini.
//!
//! `AppState` holds an `Arc<dyn Evaluator>`; `GeminiEvaluator` is the production backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::audit::models::Report;
use crate::audit::prompts::{build_system_instruction, title_context};
use crate::config::Config;
use crate::llm_client::{self, schema::report_schema, LlmClient, LlmError, StructuredPrompt};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Content cannot be empty")]
    InvalidInput,

    #[error("Gemini API key is missing. Set GEMINI_API_KEY in the environment.")]
    Configuration,

    #[error("Upstream model call failed: {0}")]
    Upstream(LlmError),

    #[error("Model response did not match the report schema: {0}")]
    Contract(serde_json::Error),

    #[error("Analysis timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Analysis was cancelled")]
    Cancelled,
}

impl From<LlmError> for EvaluationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => EvaluationError::Contract(e),
            other => EvaluationError::Upstream(other),
        }
    }
}

/// The evaluation trait. Implement this to swap the scoring backend without touching
/// the orchestrator or handlers.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, content: &str, title: Option<&str>)
        -> Result<Report, EvaluationError>;
}

/// Scores content with Gemini under the IDVS rubric.
///
/// Holds no client when no API key is configured; every call then fails with
/// `EvaluationError::Configuration` before touching the network.
pub struct GeminiEvaluator {
    llm: Option<LlmClient>,
    schema: Value,
}

impl GeminiEvaluator {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self {
            llm,
            schema: report_schema(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let llm = config
            .gemini_api_key
            .clone()
            .map(|key| LlmClient::new(key, &config.gemini_api_base))
            .transpose()?;
        Ok(Self::new(llm))
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }
}

#[async_trait]
impl Evaluator for GeminiEvaluator {
    async fn evaluate(
        &self,
        content: &str,
        title: Option<&str>,
    ) -> Result<Report, EvaluationError> {
        if content.trim().is_empty() {
            return Err(EvaluationError::InvalidInput);
        }
        let llm = self.llm.as_ref().ok_or(EvaluationError::Configuration)?;

        let system = build_system_instruction(title);
        info!(
            model = llm_client::MODEL,
            content_chars = content.chars().count(),
            title = title_context(title),
            "Requesting IDVS evaluation"
        );

        let report: Report = llm
            .call_json(StructuredPrompt {
                system: &system,
                user: content,
                schema: &self.schema,
            })
            .await?;

        info!(
            overall_score = report.overall_score,
            grade = %report.grade,
            "IDVS evaluation parsed"
        );
        Ok(report)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let evaluator = GeminiEvaluator::new(None);
        assert!(!evaluator.is_configured());
        let err = evaluator.evaluate("Hello world", None).await.unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration));
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_blank_content_rejected_before_key_check() {
        let evaluator = GeminiEvaluator::new(None);
        let err = evaluator.evaluate("  \n\t", Some("T")).await.unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidInput));
    }

    #[test]
    fn test_parse_errors_become_contract_violations() {
        let parse_err = serde_json::from_str::<Value>("{").unwrap_err();
        assert!(matches!(
            EvaluationError::from(LlmError::Parse(parse_err)),
            EvaluationError::Contract(_)
        ));
        assert!(matches!(
            EvaluationError::from(LlmError::EmptyContent),
            EvaluationError::Upstream(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_timeout_message_names_duration() {
        let err = EvaluationError::Timeout(Duration::from_secs(90));
        assert_eq!(err.to_string(), "Analysis timed out after 90s");
    }
}
