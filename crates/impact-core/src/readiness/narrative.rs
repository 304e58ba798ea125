//! Narrative readiness analysis.
//!
//! [`TemplateNarrator`] renders a deterministic markdown report and is the
//! default whenever no api key is configured. [`AnthropicNarrator`] asks the
//! Anthropic Messages API for the same report under a request deadline.

use std::time::Duration;

use indoc::formatdoc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{QualitativeAnalysis, ReadinessBand, ReadinessReport};
use crate::catalog::AssessmentTypeId;
use crate::error::{CoreError, Result};
use crate::storage::config::NarrativeConfig;

const SERVICE: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

const STRATEGIC_RECOMMENDATIONS: [&str; 5] = [
    "Focus on strengthening lowest-scoring dimensions",
    "Build comprehensive stakeholder engagement strategy",
    "Develop targeted training and communication programs",
    "Establish clear success metrics and monitoring systems",
    "Create change champion network for peer support",
];

/// Everything a generator needs to write the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub assessment_type: AssessmentTypeId,
    pub project_name: String,
    pub overall_score: f64,
    pub readiness_band: ReadinessBand,
    pub analysis: QualitativeAnalysis,
    pub recommendations: Vec<String>,
}

impl NarrativeRequest {
    pub fn from_report(project_name: &str, report: &ReadinessReport) -> Self {
        Self {
            assessment_type: report.assessment_type,
            project_name: project_name.to_string(),
            overall_score: report.overall_score,
            readiness_band: report.readiness_band,
            analysis: report.analysis.clone(),
            recommendations: report.recommendations.clone(),
        }
    }

    /// Prompt sent to a language model.
    pub fn prompt(&self) -> String {
        formatdoc! {"
            Write a concise change readiness analysis in markdown for the project \"{project}\".
            Assessment type: {kind}
            Overall readiness score: {overall:.1}/5 ({band})
            Organizational inertia: {inertia} ({inertia_level})
            Force required: {force} ({force_level})
            Expected resistance: {resistance} ({pushback:?})
            Known recommendations: {recommendations}
            Include an executive summary, the readiness level, and five strategic recommendations.",
            project = self.project_name,
            kind = self.assessment_type.display_name(),
            overall = self.overall_score,
            band = self.readiness_band,
            inertia = self.analysis.inertia.value,
            inertia_level = self.analysis.inertia.interpretation,
            force = self.analysis.force.required,
            force_level = self.analysis.force.interpretation,
            resistance = self.analysis.reaction.resistance,
            pushback = self.analysis.reaction.interpretation,
            recommendations = self.recommendations.join("; "),
        }
    }
}

/// Produces the narrative text for an assessment.
pub trait NarrativeGenerator: Send + Sync {
    fn generate(&self, request: &NarrativeRequest) -> Result<String>;
}

/// Deterministic markdown template. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl NarrativeGenerator for TemplateNarrator {
    fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let name = request.assessment_type.display_name();
        let recommendations = STRATEGIC_RECOMMENDATIONS
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {r}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(formatdoc! {"
            # {name} Readiness Analysis

            ## Executive Summary
            Your organization shows an overall readiness score of {overall:.1}/5 for {lower} projects.

            Readiness Level: **{band}**

            ## Change Dynamics
            - Organizational Inertia: {inertia} ({inertia_level})
            - Force Required: {force} ({force_level})
            - Expected Resistance: {resistance}

            ## Strategic Recommendations
            {recommendations}
            ",
            overall = request.overall_score,
            lower = name.to_lowercase(),
            band = request.readiness_band,
            inertia = request.analysis.inertia.value,
            inertia_level = request.analysis.inertia.interpretation,
            force = request.analysis.force.required,
            force_level = request.analysis.force.interpretation,
            resistance = request.analysis.reaction.description,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Anthropic Messages API client.
///
/// Owns a current-thread runtime so callers stay synchronous. Must not be
/// called from inside another tokio runtime.
pub struct AnthropicNarrator {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicNarrator {
    pub fn new(config: &NarrativeConfig, api_key: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            http: reqwest::Client::new(),
            runtime,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn request(&self, prompt: String) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(upstream)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Upstream {
                service: SERVICE.into(),
                message: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: MessagesResponse = resp.json().await.map_err(upstream)?;
        let text = parsed
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Err(CoreError::Upstream {
                service: SERVICE.into(),
                message: "empty completion".into(),
            });
        }
        Ok(text)
    }
}

impl NarrativeGenerator for AnthropicNarrator {
    fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        let prompt = request.prompt();
        let timeout = self.timeout;
        self.runtime.block_on(async {
            match tokio::time::timeout(timeout, self.request(prompt)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(timeout_secs = timeout.as_secs(), "narrative generation timed out");
                    Err(CoreError::UpstreamTimeout {
                        service: SERVICE.into(),
                        timeout_secs: timeout.as_secs(),
                    })
                }
            }
        })
    }
}

fn upstream(err: reqwest::Error) -> CoreError {
    CoreError::Upstream {
        service: SERVICE.into(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ErrorKind;
    use crate::readiness::{score, AssessmentInput};

    fn request(kind: AssessmentTypeId, value: i64) -> NarrativeRequest {
        let input = AssessmentInput::uniform(kind, "Pilot Line", value);
        let report = score(&input).unwrap();
        NarrativeRequest::from_report("Pilot Line", &report)
    }

    fn config(base_url: String, timeout_secs: u64) -> NarrativeConfig {
        NarrativeConfig {
            base_url,
            timeout_secs,
            ..NarrativeConfig::default()
        }
    }

    #[test]
    fn template_is_deterministic() {
        let req = request(AssessmentTypeId::SoftwareImplementation, 4);
        let a = TemplateNarrator.generate(&req).unwrap();
        let b = TemplateNarrator.generate(&req).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("# Software Implementation Readiness Analysis"));
        assert!(a.contains("overall readiness score of 4.0/5 for software implementation projects"));
        assert!(a.contains("Readiness Level: **Good**"));
        assert!(a.contains("5. Create change champion network for peer support"));
    }

    #[test]
    fn anthropic_returns_text_blocks() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r##"{"content":[{"type":"text","text":"# Analysis"}]}"##)
            .create();

        let narrator = AnthropicNarrator::new(&config(server.url(), 5), "test-key").unwrap();
        let text = narrator
            .generate(&request(AssessmentTypeId::GeneralReadiness, 3))
            .unwrap();
        assert_eq!(text, "# Analysis");
        mock.assert();
    }

    #[test]
    fn anthropic_non_success_is_upstream_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body("overloaded")
            .create();

        let narrator = AnthropicNarrator::new(&config(server.url(), 5), "k").unwrap();
        let err = narrator
            .generate(&request(AssessmentTypeId::GeneralReadiness, 3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(err.to_string().contains("529"));
    }

    #[test]
    fn anthropic_past_deadline_times_out() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(br#"{"content":[{"type":"text","text":"late"}]}"#)
            })
            .create();

        let narrator = AnthropicNarrator::new(&config(server.url(), 1), "k").unwrap();
        let started = std::time::Instant::now();
        let err = narrator
            .generate(&request(AssessmentTypeId::GeneralReadiness, 3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn anthropic_empty_completion_is_upstream_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content":[]}"#)
            .create();

        let narrator = AnthropicNarrator::new(&config(server.url(), 5), "k").unwrap();
        let err = narrator
            .generate(&request(AssessmentTypeId::BusinessProcess, 2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
    }
}
