// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The single outbound call: documents in, verdict out

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::gemini::GeminiClient;
use crate::intake::{format_bytes, total_bytes, ClaimFile};
use crate::verdict::VerdictReport;
use crate::{AppConfig, ClaimError, Result};

/// Trait for claim analysis backends
#[async_trait]
pub trait ClaimAnalyzer: Send + Sync {
    /// Name of this analyzer
    fn name(&self) -> &str;

    /// Analyze a non-empty set of documents
    async fn analyze(&self, files: &[ClaimFile]) -> Result<VerdictReport>;
}

/// Analyzer backed by the hosted Gemini model
pub struct GeminiAnalyzer {
    client: GeminiClient,
    model: String,
    instruction: String,
}

impl GeminiAnalyzer {
    pub fn new(client: GeminiClient, model: &str, instruction: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            instruction: instruction.to_string(),
        }
    }

    /// Build from configuration. Fails if the API key is not set.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let client = GeminiClient::new(
            &config.ai_engine.url,
            &api_key,
            Duration::from_secs(config.ai_engine.timeout_secs),
        )?;
        Ok(Self::new(client, &config.ai_engine.model, &config.prompts.claim))
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ClaimAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, files: &[ClaimFile]) -> Result<VerdictReport> {
        self.client
            .generate_verdict(&self.model, &self.instruction, files)
            .await
    }
}

/// Analyze documents, refusing an empty set before anything is sent
pub async fn analyze_documents(
    analyzer: &dyn ClaimAnalyzer,
    files: &[ClaimFile],
) -> Result<VerdictReport> {
    if files.is_empty() {
        return Err(ClaimError::NoDocuments);
    }

    info!(
        "Analyzing {} document(s), {} with {}",
        files.len(),
        format_bytes(total_bytes(files)),
        analyzer.name()
    );
    let started = Instant::now();

    match analyzer.analyze(files).await {
        Ok(report) => {
            info!(
                "Verdict: {} (fraud score {}, payout {}) in {:.1}s",
                report.final_verdict,
                report.display_score(),
                report.estimated_payout,
                started.elapsed().as_secs_f64()
            );
            Ok(report)
        }
        Err(e) => {
            error!("Claim analysis failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{PolicyChecks, Verdict};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAnalyzer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClaimAnalyzer for CountingAnalyzer {
        fn name(&self) -> &str {
            "counting"
        }

        async fn analyze(&self, files: &[ClaimFile]) -> Result<VerdictReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(VerdictReport {
                final_verdict: Verdict::Valid,
                fraud_score: 5.0,
                summary: format!("{} documents consistent", files.len()),
                estimated_payout: "$900".to_string(),
                policy_checks: PolicyChecks {
                    policy_active: true,
                    incident_covered: true,
                    time_limit_ok: true,
                },
            })
        }
    }

    #[tokio::test]
    async fn test_empty_set_never_reaches_service() {
        let analyzer = CountingAnalyzer { calls: AtomicUsize::new(0) };
        let err = analyze_documents(&analyzer, &[]).await.unwrap_err();
        assert!(matches!(err, ClaimError::NoDocuments));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delegates_non_empty_set() {
        let analyzer = CountingAnalyzer { calls: AtomicUsize::new(0) };
        let files = vec![ClaimFile {
            name: "a.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 4,
            base64: "JVBERg==".to_string(),
        }];
        let report = analyze_documents(&analyzer, &files).await.unwrap();
        assert_eq!(report.summary, "1 documents consistent");
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = AppConfig::default();
        config.ai_engine.api_key_env = "CLAIM_VALIDATOR_ANALYZER_TEST_UNSET".to_string();
        assert!(matches!(GeminiAnalyzer::from_config(&config), Err(ClaimError::Config(_))));
    }
}
