// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for the claim validator

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ClaimError;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// AI engine configuration
    #[serde(default)]
    pub ai_engine: EngineConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Upload limits and accepted types
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_engine_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_claim_prompt")]
    pub claim: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntakeConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Accepted MIME types; a trailing `/*` matches a whole family
    #[serde(default = "default_accepted")]
    pub accepted: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_engine_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-flash-latest".to_string() }
fn default_api_key_env() -> String { "API_KEY".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_max_file_bytes() -> u64 { 20 * 1024 * 1024 }
fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }

fn default_accepted() -> Vec<String> {
    vec!["image/*".to_string(), "application/pdf".to_string()]
}

fn default_claim_prompt() -> String {
    "You are an advanced AI Insurance Claim Validator system made of three cooperating agents.\n\
     1. Document Analysis Agent: read every attached document (claim forms, invoices, receipts, \
     photos of damage, police or medical reports) and extract the claimant, policy number, \
     incident type, incident date, filing date and claimed amounts.\n\
     2. Fraud Detection Agent: look for inconsistencies between documents, altered or \
     duplicated images, mismatched dates or amounts, and other red flags. Express the \
     likelihood of fraud as a score from 0 (no indication) to 100 (almost certainly fraudulent).\n\
     3. Policy Rule Agent: decide whether the policy was active and in good standing on the \
     incident date, whether the incident type is covered, and whether the claim was filed \
     within the allowed time limit.\n\
     Combine the findings into a final verdict of Valid, Invalid or Suspicious, a short \
     summary of the evidence, and an estimated payout as a currency string (use \"$0\" when \
     nothing should be paid). Respond only with JSON matching the provided schema."
        .to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            claim: default_claim_prompt(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_upload_bytes: default_max_upload_bytes(),
            accepted: default_accepted(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl IntakeConfig {
    /// Check a resolved MIME type against the accepted list
    pub fn accepts(&self, mime: &str) -> bool {
        let mime = mime.to_ascii_lowercase();
        self.accepted.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(family) => mime
                    .split_once('/')
                    .map(|(top, sub)| top == family && !sub.is_empty())
                    .unwrap_or(false),
                None => mime == pattern,
            }
        })
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| ClaimError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> crate::Result<String> {
        match std::env::var(&self.ai_engine.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ClaimError::Config(format!(
                "{} environment variable is not set",
                self.ai_engine.api_key_env
            ))),
        }
    }

    /// Socket address string for the web UI
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(config.ai_engine.model, "gemini-flash-latest");
        assert_eq!(config.ai_engine.api_key_env, "API_KEY");
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "ai_engine": { "model": "gemini-2.5-pro" }, "web": { "port": 9000 } }"#)
            .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ai_engine.model, "gemini-2.5-pro");
        assert_eq!(config.ai_engine.timeout_secs, 120);
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert!(config.prompts.claim.contains("Valid, Invalid or Suspicious"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ClaimError::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        let mut config = AppConfig::default();
        config.web.host = "0.0.0.0".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_api_key_missing_is_fatal_config_error() {
        let mut config = AppConfig::default();
        config.ai_engine.api_key_env = "CLAIM_VALIDATOR_TEST_UNSET_KEY".to_string();
        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("CLAIM_VALIDATOR_TEST_UNSET_KEY environment variable is not set"));
    }

    #[test]
    fn test_api_key_read_from_env() {
        let mut config = AppConfig::default();
        config.ai_engine.api_key_env = "CLAIM_VALIDATOR_TEST_SET_KEY".to_string();
        std::env::set_var("CLAIM_VALIDATOR_TEST_SET_KEY", " secret ");
        assert_eq!(config.api_key().unwrap(), "secret");
    }

    #[test]
    fn test_accepts_families_and_exact_types() {
        let intake = IntakeConfig::default();
        assert!(intake.accepts("image/png"));
        assert!(intake.accepts("IMAGE/JPEG"));
        assert!(intake.accepts("application/pdf"));
        assert!(!intake.accepts("text/plain"));
        assert!(!intake.accepts("image/"));
        assert!(!intake.accepts("application/zip"));
    }
}
